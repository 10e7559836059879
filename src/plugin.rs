// ABOUTME: Declarative command tools loaded from TOML descriptor files.
// ABOUTME: Each entry becomes a CommandTool that fills a shell template and runs it.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::FencecallError;
use crate::config::Config;
use crate::error::{PluginError, ToolError};
use crate::tool::{ParameterSpec, Registry, Tool, ToolDescriptor};
use crate::tools::{ShellRunner, builtin_registry};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("valid regex"));

/// Contents of a plugin descriptor file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginManifest {
    #[serde(default, rename = "tool")]
    pub tools: Vec<CommandSpec>,
}

/// One `[[tool]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    /// Shell template; `{{param}}` is replaced by the quoted argument.
    pub command: String,
    #[serde(default, rename = "parameter")]
    pub parameters: Vec<ParameterSpec>,
    /// Overrides the shell default timeout for this tool.
    pub timeout_secs: Option<f64>,
}

impl PluginManifest {
    pub fn from_toml_str(source: &str) -> Result<Self, PluginError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| PluginError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Validate every entry and build its tool.
    pub fn into_tools(
        self,
        root: &Path,
        runner: &ShellRunner,
    ) -> Result<Vec<CommandTool>, PluginError> {
        self.tools
            .into_iter()
            .map(|spec| CommandTool::new(spec, root, runner.clone()))
            .collect()
    }
}

/// A tool whose handler is a shell command template.
pub struct CommandTool {
    descriptor: ToolDescriptor,
    template: String,
    timeout_secs: Option<f64>,
    root: PathBuf,
    runner: ShellRunner,
}

impl std::fmt::Debug for CommandTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTool")
            .field("name", &self.descriptor.name)
            .field("template", &self.template)
            .finish()
    }
}

impl CommandTool {
    pub fn new(spec: CommandSpec, root: &Path, runner: ShellRunner) -> Result<Self, PluginError> {
        let invalid = |reason: String| PluginError::Invalid {
            name: spec.name.clone(),
            reason,
        };

        let descriptor = ToolDescriptor {
            name: spec.name.clone(),
            summary: spec.description.clone(),
            parameters: spec.parameters.clone(),
        };
        descriptor.check().map_err(invalid)?;

        if spec.command.trim().is_empty() {
            return Err(invalid("command is empty".to_string()));
        }
        for caps in PLACEHOLDER.captures_iter(&spec.command) {
            let placeholder = &caps[1];
            if descriptor.parameter(placeholder).is_none() {
                return Err(invalid(format!(
                    "placeholder '{{{{{}}}}}' is not a declared parameter",
                    placeholder
                )));
            }
        }

        Ok(Self {
            descriptor,
            template: spec.command,
            timeout_secs: spec.timeout_secs,
            root: root.to_path_buf(),
            runner,
        })
    }

    /// Fill the template with shell-quoted arguments. Absent optional
    /// arguments become an empty quoted string.
    pub fn render_command(&self, params: &Value) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |caps: &Captures| {
                params.get(&caps[1]).map_or_else(|| quote(""), shell_arg)
            })
            .into_owned()
    }
}

#[async_trait]
impl Tool for CommandTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let command = self.render_command(&params);
        let timeout = self.runner.timeout_for(self.timeout_secs);
        let output = self.runner.run(&command, Some(&self.root), timeout).await?;

        if !output.success() {
            return Err(ToolError::CommandFailed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(json!({
            "command": command,
            "exitCode": output.exit_code,
            "stdout": output.stdout,
            "stderr": output.stderr,
        }))
    }
}

fn shell_arg(value: &Value) -> String {
    match value {
        Value::Null => quote(""),
        Value::String(s) => quote(s),
        Value::Array(items) => items.iter().map(shell_arg).collect::<Vec<_>>().join(" "),
        other => quote(&other.to_string()),
    }
}

/// POSIX single-quote `s`.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Register the tools from every descriptor file in `paths`, after whatever
/// the registry already holds.
pub fn register_plugins(
    registry: &mut Registry,
    paths: &[PathBuf],
    root: &Path,
    runner: &ShellRunner,
) -> Result<usize, FencecallError> {
    let mut count = 0;
    for path in paths {
        let tools = PluginManifest::load(path)?.into_tools(root, runner)?;
        for tool in tools {
            registry.register(tool)?;
            count += 1;
        }
        tracing::info!(path = %path.display(), "loaded plugin file");
    }
    Ok(count)
}

/// The built-in tools followed by every plugin listed in `config`.
pub fn configured_registry(config: &Config, root: impl Into<PathBuf>) -> Result<Registry, FencecallError> {
    let root = root.into();
    let mut registry = builtin_registry(config, &root)?;
    let runner = ShellRunner::from_config(&config.shell);
    register_plugins(&mut registry, &config.plugins, &root, &runner)?;
    Ok(registry)
}
