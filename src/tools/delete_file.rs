// ABOUTME: DeleteFileTool - removes a single file.
// ABOUTME: Refuses directories and missing paths without touching the filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{require_file, resolve};
use crate::error::ToolError;
use crate::tool::{ParamKind, ParameterSpec, Tool, ToolDescriptor, decode_params};

/// Tool for deleting files.
pub struct DeleteFileTool {
    root: PathBuf,
    descriptor: ToolDescriptor,
}

impl DeleteFileTool {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            descriptor: ToolDescriptor::new("deleteFile", "Delete a file.").param(
                ParameterSpec::required("path", ParamKind::String, "The file to delete"),
            ),
        }
    }
}

#[derive(Deserialize)]
struct Params {
    path: String,
}

#[async_trait]
impl Tool for DeleteFileTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let params: Params = decode_params(self.name(), params)?;
        let target = resolve(&self.root, &params.path);

        let size = require_file(&target, &params.path)?.len();
        tokio::fs::remove_file(&target)
            .await
            .map_err(|e| ToolError::io(&params.path, e))?;

        tracing::debug!(path = %target.display(), "deleted file");
        Ok(json!({
            "path": params.path,
            "bytes": size,
        }))
    }
}
