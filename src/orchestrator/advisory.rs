// ABOUTME: Missed-tool heuristic - spots prose that describes a tool action.
// ABOUTME: Produces a non-fatal Advisory when a response has no directives.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// An action the text seems to describe without calling a tool for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    CreateFile,
    ListDirectory,
    ReadFile,
    Search,
    RunCommand,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Intent::CreateFile => "create file",
            Intent::ListDirectory => "list directory",
            Intent::ReadFile => "read file",
            Intent::Search => "search files",
            Intent::RunCommand => "run command",
        };
        f.write_str(label)
    }
}

// Verb and noun must share a sentence and sit within a few words of each other.
static PATTERNS: LazyLock<Vec<(Intent, Regex)>> = LazyLock::new(|| {
    [
        (Intent::CreateFile, r"\b(create|write|make)\b[^.!?\n]{0,40}?\bfiles?\b"),
        (
            Intent::ListDirectory,
            r"\b(list|show)\b[^.!?\n]{0,40}?\b(directory|directories|folders?)\b",
        ),
        (Intent::ReadFile, r"\b(read|open)\b[^.!?\n]{0,40}?\bfiles?\b"),
        (Intent::Search, r"\b(search|find)\b[^.!?\n]{0,40}?\b(files?|code)\b"),
        (Intent::RunCommand, r"\b(run|execute)\b[^.!?\n]{0,40}?\bcommands?\b"),
    ]
    .into_iter()
    .map(|(intent, pattern)| {
        let regex = Regex::new(&format!("(?i){}", pattern)).expect("valid regex");
        (intent, regex)
    })
    .collect()
});

/// A diagnostic note that tool usage may have been expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub intents: Vec<Intent>,
}

impl Advisory {
    /// The line appended to the response text.
    pub fn note(&self) -> String {
        let intents: Vec<String> = self.intents.iter().map(Intent::to_string).collect();
        format!(
            "⚠️ No tool directive was recognized, but the response mentions: {}. \
             Tool usage may have been expected.",
            intents.join(", ")
        )
    }
}

/// Scan `text` for described-but-not-called tool actions.
pub fn scan(text: &str) -> Option<Advisory> {
    let intents: Vec<Intent> = PATTERNS
        .iter()
        .filter(|(_, regex)| regex.is_match(text))
        .map(|(intent, _)| *intent)
        .collect();

    if intents.is_empty() {
        None
    } else {
        Some(Advisory { intents })
    }
}
