// ABOUTME: Implements the Registry - the ordered catalogue of available tools.
// ABOUTME: Validates input against each tool's schema before dispatching to it.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use super::{ExecutionResult, Tool, ToolDescriptor};
use crate::error::{RegistryError, ToolError};

/// An append-only registry of tools, kept in registration order.
///
/// Build it once at startup, then share it (it is cheap to clone) with
/// however many turns need it. Lookups are exact and case-sensitive.
#[derive(Default, Clone)]
pub struct Registry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("tools", &self.names())
            .finish()
    }
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<(), RegistryError> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a tool from an Arc.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let descriptor = tool.descriptor();
        descriptor
            .check()
            .map_err(|reason| RegistryError::InvalidDescriptor {
                name: descriptor.name.clone(),
                reason,
            })?;

        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        tracing::debug!(tool = %name, "registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style registration.
    pub fn with<T: Tool + 'static>(mut self, tool: T) -> Result<Self, RegistryError> {
        self.register(tool)?;
        Ok(self)
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    /// All descriptors, in registration order.
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    /// All tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// One catalogue line per tool, in registration order.
    pub fn catalogue(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|t| t.descriptor().catalogue_line())
            .collect()
    }

    /// A prompt fragment telling the generator which tools exist and how
    /// to call them.
    pub fn prompt_section(&self) -> String {
        let mut out = String::from(
            "You can call tools by writing a fenced block whose header is \
             `tool:NAME` (or `tool NAME`) and whose body is a JSON object of arguments:\n\n\
             ```tool:readFile\n{\"path\": \"src/main.rs\"}\n```\n\nAvailable tools:\n",
        );
        for line in self.catalogue() {
            out.push_str("- ");
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Convert all tools to provider-native tool definitions.
    pub fn to_definitions(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                let d = t.descriptor();
                serde_json::json!({
                    "name": d.name,
                    "description": d.summary,
                    "input_schema": d.json_schema(),
                })
            })
            .collect()
    }

    /// Look up `name` and validate `input` against its schema, returning
    /// the tool and the input with defaults merged in.
    pub fn validate(&self, name: &str, input: Value) -> Result<(Arc<dyn Tool>, Value), ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        let params = tool.descriptor().validate(input)?;
        Ok((tool, params))
    }

    /// Validate and run a tool. Never fails: every error, including a
    /// panicking handler, comes back as a failed [`ExecutionResult`].
    pub async fn execute(&self, name: &str, input: Value) -> ExecutionResult {
        let (tool, params) = match self.validate(name, input) {
            Ok(found) => found,
            Err(e) => return ExecutionResult::failure(name, e),
        };

        let outcome = match AssertUnwindSafe(tool.execute(params)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(ToolError::Panicked(panic_message(panic.as_ref()))),
        };
        ExecutionResult::from_outcome(name, outcome)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
