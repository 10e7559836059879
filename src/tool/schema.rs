// ABOUTME: Parameter schemas and tool descriptors - the static shape of a tool.
// ABOUTME: Validates raw directive input and renders catalogue lines for prompts.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ToolError;

/// The runtime type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    #[serde(alias = "integer")]
    Number,
    Boolean,
    #[serde(alias = "array")]
    List,
    #[serde(alias = "object")]
    Map,
}

impl ParamKind {
    /// The kind of a JSON value, or `None` for `null`.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ParamKind::Boolean),
            Value::Number(_) => Some(ParamKind::Number),
            Value::String(_) => Some(ParamKind::String),
            Value::Array(_) => Some(ParamKind::List),
            Value::Object(_) => Some(ParamKind::Map),
        }
    }

    /// Whether `value` is acceptable for this kind.
    pub fn accepts(self, value: &Value) -> bool {
        ParamKind::of(value) == Some(self)
    }

    /// The JSON Schema `type` keyword for this kind.
    pub fn json_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::List => "array",
            ParamKind::Map => "object",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::String => "string",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::List => "list",
            ParamKind::Map => "map",
        };
        f.write_str(name)
    }
}

fn kind_name(value: &Value) -> String {
    ParamKind::of(value)
        .map(|k| k.to_string())
        .unwrap_or_else(|| "null".to_string())
}

/// One formal argument of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl ParameterSpec {
    /// A parameter the caller must supply.
    pub fn required(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            description: description.into(),
        }
    }

    /// A parameter the caller may omit.
    pub fn optional(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    /// Set the value substituted when an optional parameter is omitted.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The default that applies when the parameter is absent. Required
    /// parameters never consult their default.
    pub fn effective_default(&self) -> Option<&Value> {
        if self.required {
            None
        } else {
            self.default.as_ref()
        }
    }

    fn catalogue_fragment(&self) -> String {
        let marker = if self.required { "" } else { "?" };
        format!("{}{}: {}", self.name, marker, self.kind)
    }
}

/// Static description of a callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub summary: String,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter (builder style).
    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Look up a declared parameter.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// One-line summary for the generator prompt:
    /// `name(a: string, b?: number): summary`.
    pub fn catalogue_line(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(ParameterSpec::catalogue_fragment)
            .collect();
        format!("{}({}): {}", self.name, params.join(", "), self.summary)
    }

    /// JSON Schema for the input object, for providers with native tool calling.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.parameters {
            let mut prop = Map::new();
            prop.insert("type".into(), Value::from(p.kind.json_type()));
            if !p.description.is_empty() {
                prop.insert("description".into(), Value::from(p.description.clone()));
            }
            if let Some(default) = p.effective_default() {
                prop.insert("default".into(), default.clone());
            }
            properties.insert(p.name.clone(), Value::Object(prop));
        }
        let required: Vec<Value> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| Value::from(p.name.clone()))
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check the descriptor itself is well formed.
    pub fn check(&self) -> Result<(), String> {
        if !is_identifier(&self.name) {
            return Err(format!("'{}' is not a valid tool name", self.name));
        }
        for (i, p) in self.parameters.iter().enumerate() {
            if p.name.is_empty() {
                return Err("parameter with empty name".to_string());
            }
            if self.parameters[..i].iter().any(|q| q.name == p.name) {
                return Err(format!("parameter '{}' declared twice", p.name));
            }
            if p.required && p.default.is_some() {
                return Err(format!("required parameter '{}' has a default", p.name));
            }
            if let Some(default) = &p.default {
                if !p.kind.accepts(default) {
                    return Err(format!(
                        "default for '{}' is {}, expected {}",
                        p.name,
                        kind_name(default),
                        p.kind
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validate raw input against the declared parameters and merge in
    /// defaults. Keys not declared in the schema pass through untouched.
    pub fn validate(&self, input: Value) -> Result<Value, ToolError> {
        let mut map = match input {
            Value::Object(map) => map,
            other => {
                return Err(ToolError::Validation(format!(
                    "{}: expected a map of arguments, got {}",
                    self.name,
                    kind_name(&other)
                )));
            }
        };

        // An explicit null for an optional parameter counts as omitted.
        map.retain(|key, value| {
            !(value.is_null() && self.parameter(key).is_some_and(|p| !p.required))
        });

        for p in &self.parameters {
            match map.get(&p.name) {
                None if p.required => {
                    return Err(ToolError::Validation(format!(
                        "{}: missing required parameter '{}'",
                        self.name, p.name
                    )));
                }
                Some(value) if !p.kind.accepts(value) => {
                    return Err(ToolError::Validation(format!(
                        "{}: parameter '{}' expected {}, got {}",
                        self.name,
                        p.name,
                        p.kind,
                        kind_name(value)
                    )));
                }
                _ => {}
            }
        }

        for p in &self.parameters {
            if map.contains_key(&p.name) {
                continue;
            }
            if let Some(default) = p.effective_default() {
                map.insert(p.name.clone(), default.clone());
            }
        }

        Ok(Value::Object(map))
    }
}

/// Alphanumeric/underscore token, the shape directive headers accept.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
