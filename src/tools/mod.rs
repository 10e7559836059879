// ABOUTME: Built-in tools for common agent operations.
// ABOUTME: File create/read/edit/delete, directory listing, search, and shell execution.

mod bash;
mod create_file;
mod delete_file;
mod edit_file;
mod file_search;
mod grep_search;
mod list_dir;
mod read_file;
mod shell;

use std::path::{Path, PathBuf};

pub use bash::BashTool;
pub use create_file::CreateFileTool;
pub use delete_file::DeleteFileTool;
pub use edit_file::EditFileTool;
pub use file_search::{FileSearchTool, MatchTier, score_name};
pub use grep_search::GrepSearchTool;
pub use list_dir::ListDirTool;
pub use read_file::ReadFileTool;
pub use shell::{CommandOutput, DEFAULT_DENYLIST, ShellGuard, ShellRunner};

use crate::config::Config;
use crate::error::{RegistryError, ToolError};
use crate::tool::Registry;

/// Build a registry holding the eight built-in tools, resolving relative
/// paths against `root`.
pub fn builtin_registry(config: &Config, root: impl Into<PathBuf>) -> Result<Registry, RegistryError> {
    let root = root.into();
    let shell = ShellRunner::from_config(&config.shell);

    let mut registry = Registry::new();
    registry.register(CreateFileTool::new(&root))?;
    registry.register(ReadFileTool::new(&root))?;
    registry.register(EditFileTool::new(&root, config.files.backup_on_edit))?;
    registry.register(DeleteFileTool::new(&root))?;
    registry.register(ListDirTool::new(&root))?;
    registry.register(FileSearchTool::new(&root, config.search.file_search_max_results))?;
    registry.register(GrepSearchTool::new(&root, &config.search))?;
    let default_timeout_secs = shell.default_timeout().as_secs();
    registry.register(BashTool::new(&root, shell, default_timeout_secs))?;
    Ok(registry)
}

/// Resolve `path` against `root` unless it is already absolute.
pub(crate) fn resolve(root: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    }
}

/// Fail unless `path` exists and is a regular file.
pub(crate) fn require_file(path: &Path, display: &str) -> Result<std::fs::Metadata, ToolError> {
    let meta = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::Execution(format!("file not found: {}", display))
        } else {
            ToolError::io(display, e)
        }
    })?;
    if meta.is_dir() {
        return Err(ToolError::Execution(format!(
            "{} is a directory, expected a file",
            display
        )));
    }
    Ok(meta)
}

/// Convert a JSON number into a positive count, falling back when absent.
pub(crate) fn count_param(value: Option<f64>, fallback: u64) -> usize {
    match value {
        Some(n) if n.is_finite() && n >= 1.0 => n as usize,
        _ => fallback as usize,
    }
}
