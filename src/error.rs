// ABOUTME: Defines all error types for fencecall using thiserror.
// ABOUTME: Tool failures follow a fixed taxonomy; everything else unifies under FencecallError.

use std::fmt;

/// Top-level error type for the fencecall library.
#[derive(Debug, thiserror::Error)]
pub enum FencecallError {
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Turn error: {0}")]
    Turn(#[from] TurnError),
}

/// The category a [`ToolError`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    ArgumentDecode,
    Security,
    Timeout,
    Execution,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Validation => "ValidationError",
            ErrorKind::ArgumentDecode => "ArgumentDecodeError",
            ErrorKind::Security => "SecurityError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::Execution => "ExecutionError",
        };
        f.write_str(name)
    }
}

/// Errors from a single tool invocation.
///
/// These never abort a turn: the registry and orchestrator fold them into
/// an [`ExecutionResult`](crate::tool::ExecutionResult).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    Validation(String),

    #[error("Could not decode arguments: {0}")]
    ArgumentDecode(String),

    #[error("Blocked by security policy: {0}")]
    Security(String),

    #[error("Timed out after {seconds}s")]
    Timeout { seconds: f64 },

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Command exited with code {exit_code}: {stderr}")]
    CommandFailed { exit_code: i32, stderr: String },

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

impl ToolError {
    /// The taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::NotFound(_) => ErrorKind::NotFound,
            ToolError::Validation(_) => ErrorKind::Validation,
            ToolError::ArgumentDecode(_) => ErrorKind::ArgumentDecode,
            ToolError::Security(_) => ErrorKind::Security,
            ToolError::Timeout { .. } => ErrorKind::Timeout,
            ToolError::Execution(_)
            | ToolError::CommandFailed { .. }
            | ToolError::Panicked(_) => ErrorKind::Execution,
        }
    }

    /// Wrap an I/O failure with the path it concerns.
    pub fn io(context: impl fmt::Display, err: std::io::Error) -> Self {
        ToolError::Execution(format!("{}: {}", context, err))
    }
}

/// Errors from building a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Tool '{0}' is already registered")]
    DuplicateName(String),

    #[error("Invalid descriptor for '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors from loading plugin descriptor files.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse plugin file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid plugin '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

/// Fatal errors for a whole agent turn.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Turn timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Generator failed: {0}")]
    Generator(#[source] anyhow::Error),
}
