// ABOUTME: Execution orchestrator - parses directives out of generated text and runs them.
// ABOUTME: Directives run strictly in order; results are rendered and appended to the text.

mod advisory;
mod turn;

pub use advisory::{Advisory, Intent, scan as scan_for_advisory};
pub use turn::Generator;

use std::time::Duration;

use serde_json::Value;

use crate::config::Config;
use crate::directive;
use crate::error::ToolError;
use crate::render::{RESULTS_HEADING, Renderer};
use crate::tool::{ExecutionResult, Registry};

/// The outcome of processing one response.
#[derive(Debug, Clone)]
pub struct Processed {
    /// The original text, with rendered results or an advisory appended.
    pub text: String,
    /// One result per directive, in source order.
    pub results: Vec<ExecutionResult>,
    /// Set only when no directive was found and the heuristic fired.
    pub advisory: Option<Advisory>,
}

/// Runs the directives found in generated text against a registry.
pub struct Orchestrator {
    registry: Registry,
    renderer: Renderer,
    advisory: bool,
    turn_timeout: Duration,
}

impl Orchestrator {
    /// Create an orchestrator with default rendering and the advisory enabled.
    pub fn new(registry: Registry) -> Self {
        Self::from_config(registry, &Config::default())
    }

    pub fn from_config(registry: Registry, config: &Config) -> Self {
        Self {
            registry,
            renderer: Renderer::new(config.render.clone()),
            advisory: config.orchestrator.advisory,
            turn_timeout: config.orchestrator.turn_timeout(),
        }
    }

    /// Set the renderer.
    pub fn renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Enable or disable the missed-tool advisory.
    pub fn advisory(mut self, enabled: bool) -> Self {
        self.advisory = enabled;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The configured bound for [`Orchestrator::run_turn`].
    pub fn turn_timeout(&self) -> Duration {
        self.turn_timeout
    }

    /// Run every directive in `text`, one after another, and return the
    /// text with their rendered results appended.
    ///
    /// A failing directive never stops the ones after it. A block missing
    /// its closing fence is reported as a decode failure and never run.
    /// Text without a closed directive comes back unchanged, apart from an
    /// advisory note when the heuristic fires.
    pub async fn process(&self, text: &str) -> Processed {
        let found = directive::parse(text);
        let directives = if found.iter().any(|d| d.closed) {
            found.into_vec()
        } else {
            Vec::new()
        };
        let mut results = Vec::with_capacity(directives.len());

        for directive in &directives {
            tracing::info!(tool = %directive.name, offset = directive.offset, "running directive");

            let result = if !directive.closed {
                ExecutionResult::failure(
                    &directive.name,
                    ToolError::ArgumentDecode("tool block has no closing fence".to_string()),
                )
            } else {
                match decode_payload(&directive.payload) {
                    Ok(input) => self.registry.execute(&directive.name, input).await,
                    Err(e) => ExecutionResult::failure(&directive.name, e),
                }
            };

            match result.error() {
                None => tracing::info!(tool = %directive.name, "directive succeeded"),
                Some(e) => tracing::warn!(
                    tool = %directive.name,
                    kind = %e.kind(),
                    error = %e,
                    "directive failed"
                ),
            }
            results.push(result);
        }

        let advisory = if directives.is_empty() && self.advisory {
            advisory::scan(text)
        } else {
            None
        };

        let mut out = text.to_string();
        if !results.is_empty() {
            out.push_str("\n\n");
            out.push_str(RESULTS_HEADING);
            out.push('\n');
            out.push_str(&self.renderer.render_all(&results));
        }
        if let Some(advisory) = &advisory {
            let intents: Vec<String> = advisory.intents.iter().map(Intent::to_string).collect();
            tracing::warn!(intents = %intents.join(", "), "response described tool use without a directive");
            out.push_str("\n\n");
            out.push_str(&advisory.note());
        }

        Processed {
            text: out,
            results,
            advisory,
        }
    }
}

/// Decode a directive body into an argument map. An empty body means no
/// arguments.
pub fn decode_payload(payload: &str) -> Result<Value, ToolError> {
    if payload.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| ToolError::ArgumentDecode(format!("invalid JSON: {}", e)))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ToolError::ArgumentDecode(format!(
            "expected a JSON object, got {}",
            json_type(&value)
        )))
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
