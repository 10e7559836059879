// ABOUTME: Defines ExecutionResult - the outcome of dispatching one directive.
// ABOUTME: Holds either a structured payload or a ToolError, never both.

use serde_json::Value;

use crate::error::ToolError;

/// Outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    tool: String,
    payload: Option<Value>,
    error: Option<ToolError>,
}

impl ExecutionResult {
    /// Create a successful result.
    pub fn success(tool: impl Into<String>, payload: Value) -> Self {
        Self {
            tool: tool.into(),
            payload: Some(payload),
            error: None,
        }
    }

    /// Create a failed result.
    pub fn failure(tool: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool: tool.into(),
            payload: None,
            error: Some(error),
        }
    }

    pub fn from_outcome(tool: impl Into<String>, outcome: Result<Value, ToolError>) -> Self {
        match outcome {
            Ok(payload) => Self::success(tool, payload),
            Err(error) => Self::failure(tool, error),
        }
    }

    /// Name of the tool the directive asked for.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// Fetch a top-level field from the payload.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.as_ref().and_then(|p| p.get(key))
    }
}
