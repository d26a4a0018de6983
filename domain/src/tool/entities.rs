//! Tool domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Canonical name of the plan-exit tool.
pub const EXIT_PLAN_MODE: &str = "ExitPlanMode";

/// Canonical name of the task-list management tool.
pub const TODO_WRITE: &str = "TodoWrite";

/// How a tool invocation counts toward conversation activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolClass {
    /// Modifies state: write, edit, execute, task-list mutation
    Implementation,
    /// Read-only: read, search, list, web search/fetch
    Research,
    /// Everything else (plan-exit, unknown tools)
    Neutral,
}

impl ToolClass {
    /// Classify a canonical tool name.
    pub fn of(name: &str) -> Self {
        match name {
            "Write" | "Edit" | "MultiEdit" | "Bash" | "TodoWrite" | "NotebookEdit" => {
                ToolClass::Implementation
            }
            "Read" | "Grep" | "Glob" | "LS" | "WebSearch" | "WebFetch" | "Task"
            | "NotebookRead" => ToolClass::Research,
            _ => ToolClass::Neutral,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ToolClass::Implementation => "implementation",
            ToolClass::Research => "research",
            ToolClass::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for ToolClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schema of a single property in a tool's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// JSON type name ("string", "array", "object", ...)
    #[serde(rename = "type", default = "default_string_type")]
    pub prop_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Item schema for arrays of objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ToolSchema>>,
}

fn default_string_type() -> String {
    "string".to_string()
}

impl PropertySchema {
    pub fn new(prop_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            prop_type: prop_type.into(),
            description: description.into(),
            items: None,
        }
    }

    pub fn string(description: impl Into<String>) -> Self {
        Self::new("string", description)
    }

    pub fn with_items(mut self, items: ToolSchema) -> Self {
        self.items = Some(Box::new(items));
        self
    }
}

/// Parameter schema of a tool (a JSON-Schema `object`).
///
/// `required` keeps declaration order so missing parameters are reported
/// in a stable order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type", default = "default_object_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

fn default_object_type() -> String {
    "object".to_string()
}

impl Default for ToolSchema {
    fn default() -> Self {
        Self {
            schema_type: default_object_type(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }
}

impl ToolSchema {
    pub fn object() -> Self {
        Self::default()
    }

    /// Add an optional property
    pub fn property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Add a required property
    pub fn required_property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.properties.insert(name, schema);
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }
}

/// An entry of the tool list offered to the backend model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_schema: ToolSchema,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: ToolSchema::default(),
        }
    }

    pub fn with_schema(mut self, schema: ToolSchema) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn is_plan_exit(&self) -> bool {
        self.name == EXIT_PLAN_MODE
    }

    /// Reject definitions that could never validate a call.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidToolName(self.name.clone()));
        }
        if let Some(missing) = self
            .input_schema
            .required
            .iter()
            .find(|r| !self.input_schema.has_property(r))
        {
            return Err(DomainError::InvalidToolSchema(
                self.name.clone(),
                format!("required parameter '{missing}' has no property schema"),
            ));
        }
        Ok(())
    }
}

/// A tool invocation emitted by the backend model.
///
/// A `null` or absent `input` is read as an empty map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub input: HashMap<String, serde_json::Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<HashMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: String::new(),
            input: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.input.insert(key.into(), value.into());
        self
    }

    /// Get a string argument
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(|v| v.as_str())
    }

    pub fn is_plan_exit(&self) -> bool {
        self.name == EXIT_PLAN_MODE
    }

    pub fn class(&self) -> ToolClass {
        ToolClass::of(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_class() {
        assert_eq!(ToolClass::of("Write"), ToolClass::Implementation);
        assert_eq!(ToolClass::of("Bash"), ToolClass::Implementation);
        assert_eq!(ToolClass::of("TodoWrite"), ToolClass::Implementation);
        assert_eq!(ToolClass::of("Grep"), ToolClass::Research);
        assert_eq!(ToolClass::of("WebSearch"), ToolClass::Research);
        assert_eq!(ToolClass::of("ExitPlanMode"), ToolClass::Neutral);
        assert_eq!(ToolClass::of("mystery"), ToolClass::Neutral);
    }

    #[test]
    fn test_schema_builder_keeps_required_order() {
        let schema = ToolSchema::object()
            .required_property("b", PropertySchema::string("second"))
            .required_property("a", PropertySchema::string("first"))
            .property("c", PropertySchema::new("number", "optional"));

        assert_eq!(schema.required, vec!["b", "a"]);
        assert!(schema.is_required("a"));
        assert!(!schema.is_required("c"));
        assert!(schema.has_property("c"));
    }

    #[test]
    fn test_tool_call_null_input_is_empty() {
        let call: ToolCall =
            serde_json::from_str(r#"{"name":"Read","id":"call_1","input":null}"#).unwrap();
        assert!(call.input.is_empty());

        let call: ToolCall = serde_json::from_str(r#"{"name":"Read"}"#).unwrap();
        assert!(call.input.is_empty());
        assert!(call.id.is_empty());
    }

    #[test]
    fn test_tool_definition_deserializes_json_schema() {
        let def: ToolDefinition = serde_json::from_value(serde_json::json!({
            "name": "Read",
            "description": "Read a file",
            "input_schema": {
                "type": "object",
                "properties": {"file_path": {"type": "string"}},
                "required": ["file_path"]
            }
        }))
        .unwrap();

        assert_eq!(def.name, "Read");
        assert!(def.input_schema.is_required("file_path"));
        assert_eq!(def.input_schema.properties["file_path"].prop_type, "string");
    }

    #[test]
    fn test_tool_call_helpers() {
        let call = ToolCall::new("ExitPlanMode")
            .with_id("t1")
            .with_arg("plan", "1. Add a test");
        assert!(call.is_plan_exit());
        assert_eq!(call.get_string("plan"), Some("1. Add a test"));
        assert_eq!(call.get_string("missing"), None);
        assert_eq!(call.class(), ToolClass::Neutral);
    }

    #[test]
    fn test_tool_definition_validate() {
        let ok = ToolDefinition::new("Deploy", "").with_schema(
            ToolSchema::object().required_property("env", PropertySchema::string("target")),
        );
        assert!(ok.validate().is_ok());

        assert!(matches!(
            ToolDefinition::new(" ", "").validate(),
            Err(DomainError::InvalidToolName(_))
        ));

        let mut broken = ToolDefinition::new("Deploy", "");
        broken.input_schema.required.push("env".into());
        assert!(matches!(
            broken.validate(),
            Err(DomainError::InvalidToolSchema(name, _)) if name == "Deploy"
        ));
    }
}
