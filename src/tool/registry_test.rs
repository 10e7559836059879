// ABOUTME: Tests for tool Registry - registration, lookup, validation, dispatch.
// ABOUTME: Uses small mock tools for testing.

use serde_json::{Value, json};

use super::*;
use crate::error::{ErrorKind, RegistryError, ToolError};

/// Echoes its input back as the payload.
struct EchoTool {
    descriptor: ToolDescriptor,
}

impl EchoTool {
    fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new("echo", "Echoes input back")
                .param(ParameterSpec::required("message", ParamKind::String, "Text to echo"))
                .param(
                    ParameterSpec::optional("times", ParamKind::Number, "Repeat count")
                        .with_default(1),
                )
                .param(ParameterSpec::optional("loud", ParamKind::Boolean, "Shout")),
        }
    }
}

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        Ok(params)
    }
}

struct NamedTool {
    descriptor: ToolDescriptor,
}

#[async_trait::async_trait]
impl Tool for NamedTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _params: Value) -> Result<Value, ToolError> {
        Err(ToolError::Execution("always fails".into()))
    }
}

struct PanicTool {
    descriptor: ToolDescriptor,
}

#[async_trait::async_trait]
impl Tool for PanicTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _params: Value) -> Result<Value, ToolError> {
        panic!("handler blew up");
    }
}

fn named(name: &str) -> NamedTool {
    NamedTool {
        descriptor: ToolDescriptor::new(name, "test"),
    }
}

#[test]
fn test_register_and_get() {
    let mut registry = Registry::new();
    registry.register(EchoTool::new()).unwrap();

    let tool = registry.get("echo");
    assert!(tool.is_some());
    assert_eq!(tool.unwrap().name(), "echo");
}

#[test]
fn test_get_is_case_sensitive() {
    let registry = Registry::new().with(EchoTool::new()).unwrap();
    assert!(registry.get("Echo").is_none());
    assert!(registry.get("nonexistent").is_none());
}

#[test]
fn test_duplicate_name_rejected() {
    let mut registry = Registry::new();
    registry.register(EchoTool::new()).unwrap();

    let err = registry.register(EchoTool::new()).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateName(name) if name == "echo"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_invalid_descriptor_rejected() {
    let mut registry = Registry::new();
    let err = registry.register(named("bad name")).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidDescriptor { .. }));
    assert!(registry.is_empty());
}

#[test]
fn test_list_preserves_registration_order() {
    let registry = Registry::new()
        .with(named("zeta"))
        .unwrap()
        .with(named("alpha"))
        .unwrap()
        .with(named("mid"))
        .unwrap();

    assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
    let listed: Vec<&str> = registry.list().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(listed, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_catalogue_lines() {
    let registry = Registry::new().with(EchoTool::new()).unwrap();
    assert_eq!(
        registry.catalogue(),
        vec!["echo(message: string, times?: number, loud?: boolean): Echoes input back"]
    );
    assert!(registry.prompt_section().contains("- echo(message: string"));
}

#[test]
fn test_to_definitions() {
    let registry = Registry::new().with(EchoTool::new()).unwrap();

    let defs = registry.to_definitions();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0]["name"], "echo");
    assert_eq!(defs[0]["input_schema"]["required"], json!(["message"]));
}

#[test]
fn test_clone_shares_tools() {
    let registry = Registry::new().with(EchoTool::new()).unwrap();
    let clone = registry.clone();
    assert_eq!(clone.len(), 1);
    assert!(clone.get("echo").is_some());
}

#[tokio::test]
async fn test_execute_unknown_tool() {
    let registry = Registry::new();
    let result = registry.execute("missing", json!({})).await;

    assert!(!result.is_success());
    assert_eq!(result.error().unwrap().kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_execute_missing_required() {
    let registry = Registry::new().with(EchoTool::new()).unwrap();
    let result = registry.execute("echo", json!({"times": 2})).await;

    let err = result.error().unwrap();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("message"));
}

#[tokio::test]
async fn test_execute_wrong_kind_names_both_kinds() {
    let registry = Registry::new().with(EchoTool::new()).unwrap();
    let result = registry
        .execute("echo", json!({"message": "hi", "times": "two"}))
        .await;

    let err = result.error().unwrap().to_string();
    assert!(err.contains("times"));
    assert!(err.contains("number"));
    assert!(err.contains("string"));
}

#[tokio::test]
async fn test_execute_applies_defaults_and_keeps_unknown_keys() {
    let registry = Registry::new().with(EchoTool::new()).unwrap();
    let result = registry
        .execute("echo", json!({"message": "hi", "extra": [1, 2]}))
        .await;

    assert!(result.is_success());
    let payload = result.payload().unwrap();
    assert_eq!(payload["times"], 1);
    assert_eq!(payload["extra"], json!([1, 2]));
    // no default declared, so nothing is filled in
    assert!(payload.get("loud").is_none());
}

#[tokio::test]
async fn test_execute_handler_error_becomes_result() {
    let registry = Registry::new().with(named("fails")).unwrap();
    let result = registry.execute("fails", json!({})).await;

    assert!(!result.is_success());
    assert_eq!(result.error().unwrap().kind(), ErrorKind::Execution);
}

#[tokio::test]
async fn test_execute_handler_panic_is_caught() {
    let registry = Registry::new()
        .with(PanicTool {
            descriptor: ToolDescriptor::new("panics", "test"),
        })
        .unwrap();
    let result = registry.execute("panics", json!({})).await;

    let err = result.error().unwrap();
    assert_eq!(err.kind(), ErrorKind::Execution);
    assert!(err.to_string().contains("handler blew up"));
}

#[test]
fn test_debug_lists_tool_names() {
    let registry = Registry::new().with(named("b")).unwrap().with(named("a")).unwrap();
    assert_eq!(format!("{:?}", registry), r#"Registry { tools: ["b", "a"] }"#);
}
