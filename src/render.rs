// ABOUTME: Renders ExecutionResults as short human-readable transcript blocks.
// ABOUTME: Known tools get tailored lines; anything else falls back to a generic summary.

use std::borrow::Cow;

use serde_json::Value;

use crate::config::RenderConfig;
use crate::tool::ExecutionResult;

/// Heading placed above the rendered results appended to a response.
pub const RESULTS_HEADING: &str = "Tool results:";

const INDENT: &str = "   ";

static NULL: Value = Value::Null;

/// Formats tool results for the transcript.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render one result as a block: a glyph and the tool name, then
    /// indented detail lines.
    pub fn render(&self, result: &ExecutionResult) -> String {
        let mut lines = Vec::new();
        match (result.error(), result.payload()) {
            (Some(error), _) => {
                lines.push(format!("❌ {}", result.tool()));
                lines.push(format!("{}error [{}]: {}", INDENT, error.kind(), error));
            }
            (None, payload) => {
                lines.push(format!("✅ {}", result.tool()));
                let payload = payload.unwrap_or(&NULL);
                self.details(result.tool(), payload, &mut lines);
            }
        }
        lines.join("\n")
    }

    /// Render several results separated by blank lines.
    pub fn render_all(&self, results: &[ExecutionResult]) -> String {
        results
            .iter()
            .map(|r| self.render(r))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn details(&self, tool: &str, payload: &Value, lines: &mut Vec<String>) {
        match tool {
            "createFile" => lines.push(format!(
                "{}Created {} ({} bytes written)",
                INDENT,
                text(payload, "path"),
                number(payload, "bytes")
            )),
            "readFile" => self.read_file(payload, lines),
            "editFile" => {
                lines.push(format!(
                    "{}Updated {} ({} bytes written, was {})",
                    INDENT,
                    text(payload, "path"),
                    number(payload, "bytes"),
                    number(payload, "previousBytes")
                ));
                if let Some(backup) = payload.get("backup").and_then(Value::as_str) {
                    lines.push(format!("{}backup: {}", INDENT, backup));
                }
            }
            "deleteFile" => lines.push(format!(
                "{}Deleted {} ({} bytes)",
                INDENT,
                text(payload, "path"),
                number(payload, "bytes")
            )),
            "listDir" => self.list_dir(payload, lines),
            "fileSearch" => self.file_search(payload, lines),
            "grepSearch" => self.grep_search(payload, lines),
            _ if payload.get("stdout").is_some_and(Value::is_string) => self.command(payload, lines),
            _ => self.generic(payload, lines),
        }
    }

    fn read_file(&self, payload: &Value, lines: &mut Vec<String>) {
        lines.push(format!(
            "{}Read {} ({} bytes, {})",
            INDENT,
            text(payload, "path"),
            number(payload, "bytes"),
            text(payload, "encoding")
        ));
        let content = text(payload, "content");
        lines.push(format!(
            "{}content: {:?}{}",
            INDENT,
            truncate(content, self.config.preview_chars),
            ellipsis(content, self.config.preview_chars)
        ));
    }

    fn list_dir(&self, payload: &Value, lines: &mut Vec<String>) {
        let entries = array(payload, "entries");
        lines.push(format!(
            "{}{}: {} entries",
            INDENT,
            text(payload, "path"),
            entries.len()
        ));
        for entry in entries.iter().take(self.config.list_entries) {
            let name = text(entry, "name");
            if text(entry, "type") == "directory" {
                lines.push(format!("{}- {}/ (directory)", INDENT, name));
            } else {
                lines.push(format!(
                    "{}- {} ({}, {} bytes)",
                    INDENT,
                    name,
                    text(entry, "type"),
                    number(entry, "size")
                ));
            }
        }
        self.more(entries.len(), lines);
    }

    fn file_search(&self, payload: &Value, lines: &mut Vec<String>) {
        let results = array(payload, "results");
        lines.push(format!(
            "{}{} matches for \"{}\"",
            INDENT,
            results.len(),
            text(payload, "query")
        ));
        for hit in results.iter().take(self.config.list_entries) {
            lines.push(format!(
                "{}- {} (score {})",
                INDENT,
                text(hit, "path"),
                number(hit, "score")
            ));
        }
        self.more(results.len(), lines);
    }

    fn grep_search(&self, payload: &Value, lines: &mut Vec<String>) {
        let matches = array(payload, "matches");
        let truncated = payload
            .get("truncated")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        lines.push(format!(
            "{}{} matches for /{}/{}",
            INDENT,
            matches.len(),
            text(payload, "pattern"),
            if truncated { " (limit reached)" } else { "" }
        ));
        for m in matches.iter().take(self.config.list_entries) {
            lines.push(format!(
                "{}{}:{}: {}",
                INDENT,
                text(m, "path"),
                number(m, "line"),
                text(m, "text").trim()
            ));
        }
        self.more(matches.len(), lines);
    }

    fn command(&self, payload: &Value, lines: &mut Vec<String>) {
        if let Some(command) = payload.get("command").and_then(Value::as_str) {
            lines.push(format!("{}$ {}", INDENT, command));
        }
        let limit = self.config.output_chars;
        let stdout = text(payload, "stdout");
        if !stdout.trim().is_empty() {
            lines.push(format!("{}stdout:", INDENT));
            push_block(truncate(stdout, limit).trim_end(), lines);
            if stdout.chars().count() > limit {
                lines.push(format!("{}...", INDENT));
            }
        }
        let stderr = text(payload, "stderr");
        if !stderr.trim().is_empty() {
            lines.push(format!("{}stderr:", INDENT));
            push_block(truncate(stderr, limit).trim_end(), lines);
        }
    }

    fn generic(&self, payload: &Value, lines: &mut Vec<String>) {
        if payload.is_null() {
            return;
        }
        let compact = payload.to_string();
        lines.push(format!(
            "{}{}{}",
            INDENT,
            truncate(&compact, self.config.output_chars),
            ellipsis(&compact, self.config.output_chars)
        ));
    }

    fn more(&self, total: usize, lines: &mut Vec<String>) {
        if total > self.config.list_entries {
            lines.push(format!(
                "{}... and {} more",
                INDENT,
                total - self.config.list_entries
            ));
        }
    }
}

fn text<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn number(value: &Value, key: &str) -> String {
    value
        .get(key)
        .filter(|v| v.is_number())
        .map(Value::to_string)
        .unwrap_or_else(|| "?".to_string())
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn push_block(block: &str, lines: &mut Vec<String>) {
    for line in block.lines() {
        lines.push(format!("{}  {}", INDENT, line));
    }
}

/// The first `max` characters of `s`.
pub fn truncate(s: &str, max: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max) {
        Some((end, _)) => Cow::Owned(s[..end].to_string()),
        None => Cow::Borrowed(s),
    }
}

fn ellipsis(s: &str, max: usize) -> &'static str {
    if s.chars().count() > max { "..." } else { "" }
}
