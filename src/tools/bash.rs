// ABOUTME: BashTool - executes shell commands behind the denylist and a timeout.
// ABOUTME: Returns stdout/stderr; non-zero exit codes become CommandFailed errors.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{ShellRunner, resolve};
use crate::error::ToolError;
use crate::tool::{ParamKind, ParameterSpec, Tool, ToolDescriptor, decode_params};

/// Tool for executing shell commands.
/// Uses `bash -c` on Unix and `cmd.exe /C` on Windows.
pub struct BashTool {
    root: PathBuf,
    runner: ShellRunner,
    descriptor: ToolDescriptor,
}

impl BashTool {
    pub fn new(root: impl AsRef<Path>, runner: ShellRunner, default_timeout_secs: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            runner,
            descriptor: ToolDescriptor::new(
                "bash",
                "Execute a shell command and return its output. Use for running tests, git commands, etc.",
            )
            .param(ParameterSpec::required(
                "command",
                ParamKind::String,
                "The shell command to execute",
            ))
            .param(
                ParameterSpec::optional("timeout", ParamKind::Number, "Timeout in seconds")
                    .with_default(default_timeout_secs),
            )
            .param(ParameterSpec::optional(
                "cwd",
                ParamKind::String,
                "The working directory for the command (default: current directory)",
            )),
        }
    }
}

#[derive(Deserialize)]
struct Params {
    command: String,
    timeout: Option<f64>,
    cwd: Option<String>,
}

#[async_trait]
impl Tool for BashTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let params: Params = decode_params(self.name(), params)?;
        let cwd = match &params.cwd {
            Some(dir) => resolve(&self.root, dir),
            None => self.root.clone(),
        };
        let timeout = self.runner.timeout_for(params.timeout);

        let output = self.runner.run(&params.command, Some(&cwd), timeout).await?;
        if !output.success() {
            return Err(ToolError::CommandFailed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }

        Ok(json!({
            "command": params.command,
            "exitCode": output.exit_code,
            "stdout": output.stdout,
            "stderr": output.stderr,
        }))
    }
}
