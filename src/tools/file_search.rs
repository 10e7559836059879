// ABOUTME: FileSearchTool - fuzzy file-name search under a directory.
// ABOUTME: Ranks by exact > prefix > substring > character overlap, ties in discovery order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{count_param, resolve};
use crate::error::ToolError;
use crate::tool::{ParamKind, ParameterSpec, Tool, ToolDescriptor, decode_params};

/// Minimum share of the query's distinct characters a name must contain to
/// qualify for the overlap tier.
const OVERLAP_THRESHOLD: f64 = 0.6;

/// How well a file name matches a query. Each tier has a fixed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
    Overlap,
    Substring,
    Prefix,
    Exact,
}

impl MatchTier {
    pub fn score(self) -> u32 {
        match self {
            MatchTier::Exact => 100,
            MatchTier::Prefix => 75,
            MatchTier::Substring => 50,
            MatchTier::Overlap => 25,
        }
    }
}

/// Score a file name against a query, case-insensitively. An exact match
/// is either the full name or the name without its extension.
pub fn score_name(query: &str, file_name: &str) -> Option<MatchTier> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    let name = file_name.to_lowercase();
    let stem = Path::new(&name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if name == query || stem == query {
        return Some(MatchTier::Exact);
    }
    if name.starts_with(&query) {
        return Some(MatchTier::Prefix);
    }
    if name.contains(&query) {
        return Some(MatchTier::Substring);
    }

    let wanted: HashSet<char> = query.chars().filter(|c| !c.is_whitespace()).collect();
    if wanted.is_empty() {
        return None;
    }
    let present = wanted.iter().filter(|c| name.contains(**c)).count();
    if present as f64 / wanted.len() as f64 >= OVERLAP_THRESHOLD {
        Some(MatchTier::Overlap)
    } else {
        None
    }
}

/// Tool for finding files by name.
pub struct FileSearchTool {
    root: PathBuf,
    descriptor: ToolDescriptor,
    default_max: u64,
}

impl FileSearchTool {
    pub fn new(root: impl AsRef<Path>, default_max: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            descriptor: ToolDescriptor::new(
                "fileSearch",
                "Find files whose names resemble the query, best matches first.",
            )
            .param(ParameterSpec::required(
                "query",
                ParamKind::String,
                "Name or fragment to look for",
            ))
            .param(
                ParameterSpec::optional("directory", ParamKind::String, "Directory to search")
                    .with_default("."),
            )
            .param(
                ParameterSpec::optional("maxResults", ParamKind::Number, "Maximum results")
                    .with_default(default_max),
            ),
            default_max,
        }
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Params {
    query: String,
    directory: Option<String>,
    max_results: Option<f64>,
}

#[derive(Serialize)]
struct Hit {
    path: String,
    score: u32,
}

/// Walk `dir` in a deterministic order and score every file.
fn scan(dir: &Path, query: &str) -> Vec<(PathBuf, MatchTier)> {
    let walker = WalkBuilder::new(dir)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    walker
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            score_name(query, &name).map(|tier| (entry.into_path(), tier))
        })
        .collect()
}

#[async_trait]
impl Tool for FileSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let params: Params = decode_params(self.name(), params)?;
        if params.query.trim().is_empty() {
            return Err(ToolError::Validation("fileSearch: query is empty".into()));
        }
        let directory = params.directory.unwrap_or_else(|| ".".to_string());
        let base = resolve(&self.root, &directory);
        if !base.is_dir() {
            return Err(ToolError::Execution(format!(
                "directory not found: {}",
                directory
            )));
        }
        let max = count_param(params.max_results, self.default_max);

        let query = params.query.clone();
        let mut scored = tokio::task::spawn_blocking(move || scan(&base, &query))
            .await
            .map_err(|e| ToolError::Execution(format!("search task failed: {}", e)))?;

        // stable: equal tiers keep discovery order
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        let hits: Vec<Hit> = scored
            .into_iter()
            .take(max)
            .map(|(path, tier)| Hit {
                path: self.display_path(&path),
                score: tier.score(),
            })
            .collect();

        tracing::debug!(query = %params.query, hits = hits.len(), "file search finished");
        Ok(json!({
            "query": params.query,
            "directory": directory,
            "count": hits.len(),
            "results": hits,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_score_tiers() {
        assert_eq!(score_name("main", "main.ts"), Some(MatchTier::Exact));
        assert_eq!(score_name("main.ts", "main.ts"), Some(MatchTier::Exact));
        assert_eq!(score_name("MAIN", "Main.rs"), Some(MatchTier::Exact));
        assert_eq!(score_name("main", "mainframe.rs"), Some(MatchTier::Prefix));
        assert_eq!(score_name("main", "domain.ts"), Some(MatchTier::Substring));
        assert_eq!(score_name("main", "remainder.txt"), Some(MatchTier::Substring));
        assert_eq!(score_name("mian", "animal.rs"), Some(MatchTier::Overlap));
        assert_eq!(score_name("xyz", "main.rs"), None);
        assert_eq!(score_name("  ", "main.rs"), None);
        assert!(MatchTier::Exact.score() > MatchTier::Prefix.score());
    }

    #[tokio::test]
    async fn test_exact_ranks_above_substring() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("remainder.txt"), "").unwrap();
        std::fs::write(dir.path().join("domain.ts"), "").unwrap();
        std::fs::write(dir.path().join("main.ts"), "").unwrap();

        let tool = FileSearchTool::new(dir.path(), 20);
        let result = tool.execute(json!({"query": "main"})).await.unwrap();

        let paths: Vec<&str> = result["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["path"].as_str().unwrap())
            .collect();
        assert_eq!(paths, vec!["main.ts", "domain.ts", "remainder.txt"]);
        assert_eq!(result["results"][0]["score"], 100);
        assert_eq!(result["results"][1]["score"], 50);
    }

    #[tokio::test]
    async fn test_search_recurses_and_limits() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        std::fs::write(dir.path().join("src/nested/config.rs"), "").unwrap();
        std::fs::write(dir.path().join("src/config_loader.rs"), "").unwrap();
        std::fs::write(dir.path().join("config.toml"), "").unwrap();

        let tool = FileSearchTool::new(dir.path(), 20);
        let result = tool
            .execute(json!({"query": "config", "maxResults": 2}))
            .await
            .unwrap();

        assert_eq!(result["count"], 2);
        assert_eq!(result["results"][0]["score"], 100);
        assert_eq!(result["results"][1]["score"], 100);
    }

    #[tokio::test]
    async fn test_search_missing_directory() {
        let dir = TempDir::new().unwrap();
        let tool = FileSearchTool::new(dir.path(), 20);
        let err = tool
            .execute(json!({"query": "x", "directory": "nope"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("directory not found"));
    }
}
