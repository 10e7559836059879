// ABOUTME: ReadFileTool - reads file contents as text.
// ABOUTME: Supports utf8, latin1, and ascii decoding.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{require_file, resolve};
use crate::error::ToolError;
use crate::tool::{ParamKind, ParameterSpec, Tool, ToolDescriptor, decode_params};

/// Tool for reading file contents.
pub struct ReadFileTool {
    root: PathBuf,
    descriptor: ToolDescriptor,
}

impl ReadFileTool {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            descriptor: ToolDescriptor::new(
                "readFile",
                "Read the contents of a file. Returns the file contents as text.",
            )
            .param(ParameterSpec::required(
                "path",
                ParamKind::String,
                "The path to the file to read",
            ))
            .param(
                ParameterSpec::optional(
                    "encoding",
                    ParamKind::String,
                    "Text encoding: utf8, latin1 or ascii",
                )
                .with_default("utf8"),
            ),
        }
    }
}

#[derive(Deserialize)]
struct Params {
    path: String,
    #[serde(default = "default_encoding")]
    encoding: String,
}

fn default_encoding() -> String {
    "utf8".to_string()
}

fn decode(bytes: Vec<u8>, encoding: &str, path: &str) -> Result<String, ToolError> {
    match encoding.to_ascii_lowercase().as_str() {
        "utf8" | "utf-8" => String::from_utf8(bytes)
            .map_err(|_| ToolError::Execution(format!("{} is not valid UTF-8", path))),
        "latin1" | "latin-1" | "iso-8859-1" => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        "ascii" => {
            if bytes.is_ascii() {
                Ok(bytes.iter().map(|&b| char::from(b)).collect())
            } else {
                Err(ToolError::Execution(format!("{} contains non-ASCII bytes", path)))
            }
        }
        other => Err(ToolError::Validation(format!(
            "readFile: unsupported encoding '{}'",
            other
        ))),
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let params: Params = decode_params(self.name(), params)?;
        let target = resolve(&self.root, &params.path);

        require_file(&target, &params.path)?;
        let bytes = tokio::fs::read(&target)
            .await
            .map_err(|e| ToolError::io(&params.path, e))?;
        let size = bytes.len();
        let content = decode(bytes, &params.encoding, &params.path)?;

        tracing::debug!(path = %target.display(), bytes = size, "read file");
        Ok(json!({
            "path": params.path,
            "encoding": params.encoding,
            "bytes": size,
            "content": content,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_read_file_success() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Hello, world!").unwrap();

        let tool = ReadFileTool::new("/");
        let result = tool
            .execute(json!({"path": file.path().to_str().unwrap()}))
            .await
            .unwrap();

        assert_eq!(result["content"], "Hello, world!\n");
        assert_eq!(result["bytes"], 14);
    }

    #[tokio::test]
    async fn test_read_file_not_found() {
        let dir = TempDir::new().unwrap();
        let tool = ReadFileTool::new(dir.path());
        let err = tool.execute(json!({"path": "missing.txt"})).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Execution);
        assert!(err.to_string().contains("file not found"));
    }

    #[tokio::test]
    async fn test_read_directory_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let tool = ReadFileTool::new(dir.path());
        let err = tool.execute(json!({"path": "sub"})).await.unwrap_err();
        assert!(err.to_string().contains("is a directory"));
    }

    #[tokio::test]
    async fn test_read_latin1() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("l1.txt"), [0x63, 0x61, 0x66, 0xe9]).unwrap();

        let tool = ReadFileTool::new(dir.path());
        let err = tool.execute(json!({"path": "l1.txt"})).await.unwrap_err();
        assert!(err.to_string().contains("UTF-8"));

        let result = tool
            .execute(json!({"path": "l1.txt", "encoding": "latin1"}))
            .await
            .unwrap();
        assert_eq!(result["content"], "café");
    }

    #[tokio::test]
    async fn test_read_unknown_encoding() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();

        let tool = ReadFileTool::new(dir.path());
        let err = tool
            .execute(json!({"path": "a.txt", "encoding": "ebcdic"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
