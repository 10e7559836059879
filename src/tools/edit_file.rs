// ABOUTME: EditFileTool - replaces the full content of an existing file.
// ABOUTME: Optionally snapshots the previous content to a timestamped sibling.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{require_file, resolve};
use crate::error::ToolError;
use crate::tool::{ParamKind, ParameterSpec, Tool, ToolDescriptor, decode_params};

/// Tool for overwriting existing files.
///
/// Unlike createFile, the target must already exist. With `backup` set the
/// old content is copied to `<name>.<timestamp>.bak` next to the file before
/// anything is written.
pub struct EditFileTool {
    root: PathBuf,
    descriptor: ToolDescriptor,
}

impl EditFileTool {
    pub fn new(root: impl AsRef<Path>, backup_by_default: bool) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            descriptor: ToolDescriptor::new(
                "editFile",
                "Replace the entire content of an existing file.",
            )
            .param(ParameterSpec::required(
                "path",
                ParamKind::String,
                "The path to the file to edit",
            ))
            .param(ParameterSpec::required(
                "content",
                ParamKind::String,
                "The new file content",
            ))
            .param(
                ParameterSpec::optional(
                    "backup",
                    ParamKind::Boolean,
                    "Keep a timestamped copy of the old content",
                )
                .with_default(backup_by_default),
            ),
        }
    }
}

#[derive(Deserialize)]
struct Params {
    path: String,
    content: String,
    #[serde(default)]
    backup: bool,
}

fn backup_path(target: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S-%3f");
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{}.{}.bak", name, stamp))
}

#[async_trait]
impl Tool for EditFileTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let params: Params = decode_params(self.name(), params)?;
        let target = resolve(&self.root, &params.path);

        let previous = require_file(&target, &params.path)?.len();

        let backup = if params.backup {
            let copy = backup_path(&target);
            tokio::fs::copy(&target, &copy)
                .await
                .map_err(|e| ToolError::io(format!("backup of {}", params.path), e))?;
            tracing::debug!(path = %target.display(), backup = %copy.display(), "backed up file");
            Some(copy.display().to_string())
        } else {
            None
        };

        tokio::fs::write(&target, &params.content)
            .await
            .map_err(|e| ToolError::io(&params.path, e))?;

        tracing::debug!(path = %target.display(), bytes = params.content.len(), "edited file");
        Ok(json!({
            "path": params.path,
            "bytes": params.content.len(),
            "previousBytes": previous,
            "backup": backup,
        }))
    }
}
