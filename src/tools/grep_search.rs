// ABOUTME: GrepSearchTool - regex search over file contents.
// ABOUTME: Filters by file type, skips unreadable files, and stops at the result cap.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ignore::WalkBuilder;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{count_param, resolve};
use crate::config::SearchConfig;
use crate::error::ToolError;
use crate::tool::{ParamKind, ParameterSpec, Tool, ToolDescriptor, decode_params};

/// Tool for searching file contents with regex patterns.
pub struct GrepSearchTool {
    root: PathBuf,
    descriptor: ToolDescriptor,
    default_max: u64,
    max_file_bytes: u64,
}

impl GrepSearchTool {
    pub fn new(root: impl AsRef<Path>, config: &SearchConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            descriptor: ToolDescriptor::new(
                "grepSearch",
                "Search file contents for a regular expression.",
            )
            .param(ParameterSpec::required(
                "pattern",
                ParamKind::String,
                "The regex pattern to search for",
            ))
            .param(
                ParameterSpec::optional("directory", ParamKind::String, "Directory to search")
                    .with_default("."),
            )
            .param(ParameterSpec::optional(
                "fileTypes",
                ParamKind::List,
                "Extensions or globs to include, e.g. [\"rs\", \"*.toml\"]",
            ))
            .param(
                ParameterSpec::optional("caseSensitive", ParamKind::Boolean, "Match case")
                    .with_default(false),
            )
            .param(
                ParameterSpec::optional("maxResults", ParamKind::Number, "Maximum matches")
                    .with_default(config.grep_max_results),
            ),
            default_max: config.grep_max_results,
            max_file_bytes: config.grep_max_file_bytes,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Params {
    pattern: String,
    directory: Option<String>,
    #[serde(default)]
    file_types: Vec<String>,
    #[serde(default)]
    case_sensitive: bool,
    max_results: Option<f64>,
}

#[derive(Debug, Serialize)]
struct Match {
    path: String,
    line: usize,
    text: String,
}

/// Turn `rs`, `.rs` or `*.rs` into a file-name glob.
fn file_type_pattern(spec: &str) -> Result<glob::Pattern, ToolError> {
    let spec = spec.trim();
    let glob_text = if spec.contains(['*', '?', '[']) {
        spec.to_string()
    } else {
        format!("*.{}", spec.trim_start_matches('.'))
    };
    glob::Pattern::new(&glob_text)
        .map_err(|e| ToolError::Validation(format!("grepSearch: bad file type '{}': {}", spec, e)))
}

struct Scan {
    regex: Regex,
    filters: Vec<glob::Pattern>,
    max: usize,
    max_file_bytes: u64,
}

impl Scan {
    fn wants(&self, name: &str) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|p| p.matches(name))
    }

    /// Returns the matches and whether the cap cut the scan short.
    fn run(&self, dir: &Path, root: &Path) -> (Vec<Match>, bool) {
        let mut matches = Vec::new();
        let walker = WalkBuilder::new(dir)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker.filter_map(Result::ok) {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if !self.wants(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let too_big = entry
                .metadata()
                .map(|m| m.len() > self.max_file_bytes)
                .unwrap_or(true);
            if too_big {
                continue;
            }
            let content = match std::fs::read_to_string(entry.path()) {
                Ok(c) => c,
                Err(e) => {
                    tracing::trace!(path = %entry.path().display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };

            let shown = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .display()
                .to_string();
            for (idx, line) in content.lines().enumerate() {
                if !self.regex.is_match(line) {
                    continue;
                }
                if matches.len() == self.max {
                    return (matches, true);
                }
                matches.push(Match {
                    path: shown.clone(),
                    line: idx + 1,
                    text: line.trim().to_string(),
                });
            }
        }
        (matches, false)
    }
}

#[async_trait]
impl Tool for GrepSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let params: Params = decode_params(self.name(), params)?;

        let regex = RegexBuilder::new(&params.pattern)
            .case_insensitive(!params.case_sensitive)
            .build()
            .map_err(|e| ToolError::Validation(format!("grepSearch: invalid regex: {}", e)))?;
        let filters = params
            .file_types
            .iter()
            .map(|t| file_type_pattern(t))
            .collect::<Result<Vec<_>, _>>()?;

        let directory = params.directory.unwrap_or_else(|| ".".to_string());
        let base = resolve(&self.root, &directory);
        if !base.exists() {
            return Err(ToolError::Execution(format!(
                "directory not found: {}",
                directory
            )));
        }

        let scan = Scan {
            regex,
            filters,
            max: count_param(params.max_results, self.default_max),
            max_file_bytes: self.max_file_bytes,
        };
        let root = self.root.clone();
        let (matches, truncated) = tokio::task::spawn_blocking(move || scan.run(&base, &root))
            .await
            .map_err(|e| ToolError::Execution(format!("search task failed: {}", e)))?;

        tracing::debug!(pattern = %params.pattern, matches = matches.len(), truncated, "grep finished");
        Ok(json!({
            "pattern": params.pattern,
            "count": matches.len(),
            "truncated": truncated,
            "matches": matches,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;
    use tempfile::TempDir;

    fn tool(dir: &TempDir) -> GrepSearchTool {
        GrepSearchTool::new(dir.path(), &SearchConfig::default())
    }

    #[tokio::test]
    async fn test_search_finds_matches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Hello, world!").unwrap();
        writeln!(file, "Goodbye, world!").unwrap();
        writeln!(file, "hello again!").unwrap();

        let result = tool(&dir)
            .execute(json!({"pattern": "Hello", "caseSensitive": true}))
            .await
            .unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["matches"][0]["line"], 1);
        assert_eq!(result["matches"][0]["path"], "test.txt");

        let result = tool(&dir).execute(json!({"pattern": "Hello"})).await.unwrap();
        assert_eq!(result["count"], 2);
        assert_eq!(result["matches"][1]["line"], 3);
    }

    #[tokio::test]
    async fn test_search_no_matches() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("test.txt"), "Hello, world!").unwrap();

        let result = tool(&dir).execute(json!({"pattern": "foobar"})).await.unwrap();
        assert_eq!(result["count"], 0);
        assert_eq!(result["truncated"], false);
    }

    #[tokio::test]
    async fn test_search_invalid_regex() {
        let dir = TempDir::new().unwrap();
        let err = tool(&dir)
            .execute(json!({"pattern": "[invalid"}))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("invalid regex"));
    }

    #[tokio::test]
    async fn test_search_file_types() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("lib.rs"), "fn target() {}").unwrap();
        std::fs::write(dir.path().join("notes.md"), "target").unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "target = 1").unwrap();

        let result = tool(&dir)
            .execute(json!({"pattern": "target", "fileTypes": ["rs", "*.toml"]}))
            .await
            .unwrap();

        let paths: Vec<&str> = result["matches"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["Cargo.toml", "lib.rs"]);
    }

    #[tokio::test]
    async fn test_search_stops_at_max() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x\nx\nx\n").unwrap();
        std::fs::write(dir.path().join("b.txt"), "x\n").unwrap();

        let result = tool(&dir)
            .execute(json!({"pattern": "x", "maxResults": 2}))
            .await
            .unwrap();
        assert_eq!(result["count"], 2);
        assert_eq!(result["truncated"], true);
    }

    #[tokio::test]
    async fn test_search_skips_binary_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("blob.bin"), [0xff, 0xfe, b'x']).unwrap();
        std::fs::write(dir.path().join("text.txt"), "x").unwrap();

        let result = tool(&dir).execute(json!({"pattern": "x"})).await.unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["matches"][0]["path"], "text.txt");
    }

    #[test]
    fn test_file_type_pattern() {
        assert!(file_type_pattern("rs").unwrap().matches("main.rs"));
        assert!(file_type_pattern(".rs").unwrap().matches("main.rs"));
        assert!(file_type_pattern("*.rs").unwrap().matches("main.rs"));
        assert!(!file_type_pattern("rs").unwrap().matches("main.rsx"));
    }
}
