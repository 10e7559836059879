// ABOUTME: Defines the Tool trait - the core abstraction for agent capabilities.
// ABOUTME: A tool exposes a descriptor and an async handler over validated input.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ToolDescriptor;
use crate::error::ToolError;

/// A tool that can be invoked from a directive.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the static description of this tool.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Returns the unique name of this tool.
    fn name(&self) -> &str {
        &self.descriptor().name
    }

    /// Execute the tool.
    ///
    /// `params` has already been validated against the descriptor and has
    /// defaults merged in. Implementations usually start with
    /// [`decode_params`] to get a typed view of it.
    async fn execute(&self, params: Value) -> Result<Value, ToolError>;
}

/// Decode validated input into the tool's typed parameter struct.
pub fn decode_params<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::Validation(format!("{}: {}", tool, e)))
}
