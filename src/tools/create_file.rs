// ABOUTME: CreateFileTool - writes a new file, refusing to overwrite.
// ABOUTME: Creates parent directories if needed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::resolve;
use crate::error::ToolError;
use crate::tool::{ParamKind, ParameterSpec, Tool, ToolDescriptor, decode_params};

/// Tool for creating new files.
pub struct CreateFileTool {
    root: PathBuf,
    descriptor: ToolDescriptor,
}

impl CreateFileTool {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            descriptor: ToolDescriptor::new(
                "createFile",
                "Create a new file with the given content. Fails if the file already exists.",
            )
            .param(ParameterSpec::required(
                "path",
                ParamKind::String,
                "Path of the file to create",
            ))
            .param(
                ParameterSpec::optional("content", ParamKind::String, "Initial file content")
                    .with_default(""),
            ),
        }
    }
}

#[derive(Deserialize)]
struct Params {
    path: String,
    #[serde(default)]
    content: String,
}

#[async_trait]
impl Tool for CreateFileTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let params: Params = decode_params(self.name(), params)?;
        let target = resolve(&self.root, &params.path);

        if target.exists() {
            return Err(ToolError::Execution(format!(
                "{} already exists",
                params.path
            )));
        }

        // Create parent directories if needed
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ToolError::io(parent.display(), e))?;
            }
        }

        // create_new closes the race between the exists() check and the write
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = options.open(&target).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                ToolError::Execution(format!("{} already exists", params.path))
            } else {
                ToolError::io(&params.path, e)
            }
        })?;
        tokio::io::AsyncWriteExt::write_all(&mut file, params.content.as_bytes())
            .await
            .map_err(|e| ToolError::io(&params.path, e))?;

        tracing::debug!(path = %target.display(), bytes = params.content.len(), "created file");
        Ok(json!({
            "path": params.path,
            "bytes": params.content.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_file_success() {
        let dir = TempDir::new().unwrap();

        let tool = CreateFileTool::new(dir.path());
        let result = tool
            .execute(json!({"path": "test.txt", "content": "Hello, world!"}))
            .await
            .unwrap();

        assert_eq!(result["bytes"], 13);
        let content = std::fs::read_to_string(dir.path().join("test.txt")).unwrap();
        assert_eq!(content, "Hello, world!");
    }

    #[tokio::test]
    async fn test_create_file_twice_fails_without_modifying() {
        let dir = TempDir::new().unwrap();
        let tool = CreateFileTool::new(dir.path());

        tool.execute(json!({"path": "a.txt", "content": "first"}))
            .await
            .unwrap();
        let err = tool
            .execute(json!({"path": "a.txt", "content": "second"}))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Execution);
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "first");
    }

    #[tokio::test]
    async fn test_create_file_creates_directories() {
        let dir = TempDir::new().unwrap();

        let tool = CreateFileTool::new(dir.path());
        tool.execute(json!({"path": "nested/dir/test.txt", "content": "x"}))
            .await
            .unwrap();

        assert!(dir.path().join("nested/dir/test.txt").is_file());
    }

    #[tokio::test]
    async fn test_create_file_without_content() {
        let dir = TempDir::new().unwrap();

        let tool = CreateFileTool::new(dir.path());
        let result = tool.execute(json!({"path": "empty.txt"})).await.unwrap();

        assert_eq!(result["bytes"], 0);
        assert_eq!(std::fs::read_to_string(dir.path().join("empty.txt")).unwrap(), "");
    }
}
