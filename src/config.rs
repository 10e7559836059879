// ABOUTME: Configuration loaded from TOML - shell limits, render sizes, search caps.
// ABOUTME: Every field has a default so an empty or missing file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming a config file for [`Config::discover`].
pub const CONFIG_ENV: &str = "FENCECALL_CONFIG";

/// File name looked up in the working directory by [`Config::discover`].
pub const CONFIG_FILE: &str = "fencecall.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shell: ShellConfig,
    pub files: FilesConfig,
    pub search: SearchConfig,
    pub render: RenderConfig,
    pub orchestrator: OrchestratorConfig,
    /// Plugin descriptor files to load after the built-in tools.
    pub plugins: Vec<PathBuf>,
}

/// Limits for shell execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Timeout applied when a directive does not ask for one. Zero means
    /// the built-in default.
    pub timeout_secs: u64,
    /// Upper bound on any requested timeout.
    pub max_timeout_secs: u64,
    /// Extra substrings appended to the built-in denylist.
    pub denylist: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_timeout_secs: 600,
            denylist: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Default for editFile's `backup` parameter.
    pub backup_on_edit: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            backup_on_edit: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub file_search_max_results: u64,
    pub grep_max_results: u64,
    /// grepSearch skips files larger than this.
    pub grep_max_file_bytes: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            file_search_max_results: 20,
            grep_max_results: 50,
            grep_max_file_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Truncation limits for rendered results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Characters of file content shown for readFile.
    pub preview_chars: usize,
    /// Entries shown for listDir and search results.
    pub list_entries: usize,
    /// Characters of stdout shown for bash.
    pub output_chars: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            preview_chars: 200,
            list_entries: 10,
            output_chars: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Outer bound on generate + execute for one turn.
    pub turn_timeout_secs: u64,
    /// Run the missed-tool heuristic when a response has no directives.
    pub advisory: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            turn_timeout_secs: 300,
            advisory: true,
        }
    }
}

impl OrchestratorConfig {
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }
}

impl Config {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file. Relative plugin paths are resolved
    /// against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&source)?;

        if let Some(dir) = path.parent() {
            for plugin in &mut config.plugins {
                if plugin.is_relative() {
                    *plugin = dir.join(&*plugin);
                }
            }
        }
        Ok(config)
    }

    /// Load from `$FENCECALL_CONFIG`, then `./fencecall.toml`, else defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            tracing::debug!(path = %path, "loading config from environment");
            return Self::load(path);
        }
        let local = Path::new(CONFIG_FILE);
        if local.is_file() {
            tracing::debug!(path = %local.display(), "loading config from working directory");
            return Self::load(local);
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.shell.timeout_secs, 30);
        assert!(config.files.backup_on_edit);
        assert_eq!(config.render.preview_chars, 200);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml_str(
            r#"
            plugins = ["tools.toml"]

            [shell]
            timeout_secs = 5
            denylist = ["curl"]

            [orchestrator]
            advisory = false
            "#,
        )
        .unwrap();

        assert_eq!(config.shell.timeout_secs, 5);
        assert_eq!(config.shell.max_timeout_secs, 600);
        assert_eq!(config.shell.denylist, vec!["curl"]);
        assert!(!config.orchestrator.advisory);
        assert_eq!(config.orchestrator.turn_timeout(), Duration::from_secs(300));
        assert_eq!(config.plugins, vec![PathBuf::from("tools.toml")]);
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::from_toml_str("[shell]\ntimeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_resolves_plugin_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fencecall.toml");
        std::fs::write(&path, "plugins = [\"extra.toml\"]\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.plugins, vec![dir.path().join("extra.toml")]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/fencecall.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
