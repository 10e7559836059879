// ABOUTME: ListDirTool - lists the entries of one directory.
// ABOUTME: Reports each entry's type and size, sorted by name.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::resolve;
use crate::error::ToolError;
use crate::tool::{ParamKind, ParameterSpec, Tool, ToolDescriptor, decode_params};

/// Tool for listing directory contents.
pub struct ListDirTool {
    root: PathBuf,
    descriptor: ToolDescriptor,
}

impl ListDirTool {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            descriptor: ToolDescriptor::new(
                "listDir",
                "List the files and directories inside a directory.",
            )
            .param(ParameterSpec::required(
                "path",
                ParamKind::String,
                "The directory to list",
            )),
        }
    }
}

#[derive(Deserialize)]
struct Params {
    path: String,
}

#[derive(Serialize)]
struct Entry {
    name: String,
    #[serde(rename = "type")]
    kind: &'static str,
    size: u64,
}

#[async_trait]
impl Tool for ListDirTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let params: Params = decode_params(self.name(), params)?;
        let target = resolve(&self.root, &params.path);

        if !target.exists() {
            return Err(ToolError::Execution(format!(
                "directory not found: {}",
                params.path
            )));
        }
        if !target.is_dir() {
            return Err(ToolError::Execution(format!(
                "{} is not a directory",
                params.path
            )));
        }

        let mut reader = tokio::fs::read_dir(&target)
            .await
            .map_err(|e| ToolError::io(&params.path, e))?;
        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ToolError::io(&params.path, e))?
        {
            let file_type = entry.file_type().await.ok();
            let kind = match file_type {
                Some(t) if t.is_symlink() => "symlink",
                Some(t) if t.is_dir() => "directory",
                _ => "file",
            };
            let size = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta.len(),
                _ => 0,
            };
            entries.push(Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
                size,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(json!({
            "path": params.path,
            "count": entries.len(),
            "entries": entries,
        }))
    }
}
