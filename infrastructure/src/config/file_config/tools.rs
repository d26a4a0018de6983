//! Tool schema configuration from TOML (`[tools]` section)
//!
//! Operators declare schemas for tools the built-in fallback table does not
//! know, so the validator and corrector can work on them too.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use toolguard_domain::{DomainError, PropertySchema, ToolDefinition, ToolSchema};

const SUPPORTED_TYPES: &[&str] = &["string", "number", "integer", "boolean", "array", "object"];

/// Errors turning a `[tools.custom.*]` entry into a [`ToolDefinition`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaLoadError {
    #[error("tool '{tool}': parameter '{param}' has unsupported type '{param_type}'")]
    UnsupportedType {
        tool: String,
        param: String,
        param_type: String,
    },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

impl SchemaLoadError {
    pub fn tool(&self) -> &str {
        match self {
            SchemaLoadError::UnsupportedType { tool, .. } => tool,
            SchemaLoadError::Invalid(DomainError::InvalidToolName(name)) => name,
            SchemaLoadError::Invalid(DomainError::InvalidToolSchema(name, _)) => name,
        }
    }
}

/// A single parameter of a custom tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCustomToolParameter {
    /// JSON type: "string", "number", "integer", "boolean", "array", "object"
    #[serde(rename = "type", default = "default_string_type")]
    pub param_type: String,
    #[serde(default)]
    pub description: String,
    /// Whether this parameter is required (default: false)
    #[serde(default)]
    pub required: bool,
}

fn default_string_type() -> String {
    "string".to_string()
}

/// Custom tool schema
///
/// # Example
///
/// ```toml
/// [tools.custom.Deploy]
/// description = "Deploy the service"
///
/// [tools.custom.Deploy.parameters.env]
/// type = "string"
/// description = "Target environment"
/// required = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCustomToolConfig {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: HashMap<String, FileCustomToolParameter>,
}

impl FileCustomToolConfig {
    pub fn to_definition(&self, name: &str) -> Result<ToolDefinition, SchemaLoadError> {
        let mut properties = BTreeMap::new();
        let mut required = Vec::new();

        for (param, declared) in &self.parameters {
            let param_type = declared.param_type.to_lowercase();
            if !SUPPORTED_TYPES.contains(&param_type.as_str()) {
                return Err(SchemaLoadError::UnsupportedType {
                    tool: name.to_string(),
                    param: param.clone(),
                    param_type: declared.param_type.clone(),
                });
            }
            if declared.required {
                required.push(param.clone());
            }
            properties.insert(
                param.clone(),
                PropertySchema::new(param_type, declared.description.clone()),
            );
        }
        // HashMap order is arbitrary
        required.sort();

        let definition = ToolDefinition::new(name, self.description.clone()).with_schema(
            ToolSchema {
                properties,
                required,
                ..ToolSchema::object()
            },
        );
        definition.validate()?;
        Ok(definition)
    }
}

/// Complete tools configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Operator-declared tool schemas, keyed by canonical tool name
    pub custom: HashMap<String, FileCustomToolConfig>,
}

impl FileToolsConfig {
    /// Convert every custom tool, sorted by name.
    ///
    /// Returns the definitions that loaded and the errors of those that
    /// did not; one bad entry never hides the others.
    pub fn custom_definitions(&self) -> (Vec<ToolDefinition>, Vec<SchemaLoadError>) {
        let mut names: Vec<&String> = self.custom.keys().collect();
        names.sort();

        let mut definitions = Vec::new();
        let mut errors = Vec::new();
        for name in names {
            match self.custom[name].to_definition(name) {
                Ok(def) => definitions.push(def),
                Err(e) => errors.push(e),
            }
        }
        (definitions, errors)
    }
}
