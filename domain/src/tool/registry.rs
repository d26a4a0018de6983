//! Schema registry: canonical tool name → parameter schema.
//!
//! The registry is constructed once at process start, pre-populated with
//! fallback schemas for the standard tool set, and shared across requests
//! behind an `Arc`. Registration may race with in-flight validations, so
//! entries sit behind an [`RwLock`] and readers receive `Arc` snapshots:
//! no lock is held while a caller validates against a schema.
//!
//! ```
//! use toolguard_domain::tool::registry::SchemaRegistry;
//!
//! let registry = SchemaRegistry::with_fallbacks();
//! assert!(registry.get_schema("TodoWrite").is_some());
//! assert!(registry.get_schema("Nonexistent").is_none());
//! ```

use super::entities::{PropertySchema, ToolDefinition, ToolSchema};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide registry of tool schemas.
///
/// Last-writer-wins by name; there is no removal.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<ToolSchema>>>,
}

impl SchemaRegistry {
    /// Create an empty registry (mostly useful in tests)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the fallback schemas for the standard tools.
    pub fn with_fallbacks() -> Self {
        let registry = Self::new();
        for tool in fallback_tools() {
            registry.register_tool(tool);
        }
        registry
    }

    /// Look up the schema registered under `name` (exact, case-sensitive).
    pub fn get_schema(&self, name: &str) -> Option<Arc<ToolSchema>> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Names of every registered tool, sorted.
    pub fn list_tools(&self) -> BTreeSet<String> {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Register (or replace) the schema for `tool.name`.
    pub fn register_tool(&self, tool: ToolDefinition) {
        let ToolDefinition {
            name, input_schema, ..
        } = tool;
        self.schemas
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, Arc::new(input_schema));
    }

    /// Register every tool in `tools` under one write lock.
    pub fn register_all<'a>(&self, tools: impl IntoIterator<Item = &'a ToolDefinition>) {
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        for tool in tools {
            schemas.insert(tool.name.clone(), Arc::new(tool.input_schema.clone()));
        }
    }

    /// Request-scoped copy: this registry plus the schemas a request carries.
    ///
    /// Request tools without any declared property keep the registered
    /// schema, since clients often send bare names. The shared registry is
    /// left untouched.
    pub fn overlay<'a>(&self, tools: impl IntoIterator<Item = &'a ToolDefinition>) -> Self {
        let mut schemas = self
            .schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for tool in tools {
            if tool.input_schema.properties.is_empty() && schemas.contains_key(&tool.name) {
                continue;
            }
            schemas.insert(tool.name.clone(), Arc::new(tool.input_schema.clone()));
        }
        Self {
            schemas: RwLock::new(schemas),
        }
    }

    pub fn len(&self) -> usize {
        self.schemas
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn todo_item_schema() -> ToolSchema {
    ToolSchema::object()
        .required_property("content", PropertySchema::string("Task description"))
        .required_property(
            "status",
            PropertySchema::string("One of: pending, in_progress, completed"),
        )
        .property("priority", PropertySchema::string("One of: high, medium, low"))
        .property("id", PropertySchema::string("Stable task identifier"))
        .property(
            "activeForm",
            PropertySchema::string("Present-continuous form shown while in progress"),
        )
}

/// Fallback definitions for the standard tool set.
///
/// These keep the pipeline functional when the client sends no tool list.
pub fn fallback_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new("Read", "Read a file from the local filesystem").with_schema(
            ToolSchema::object()
                .required_property("file_path", PropertySchema::string("Absolute path"))
                .property("offset", PropertySchema::new("number", "Line to start from"))
                .property("limit", PropertySchema::new("number", "Number of lines")),
        ),
        ToolDefinition::new("Write", "Write a file to the local filesystem").with_schema(
            ToolSchema::object()
                .required_property("file_path", PropertySchema::string("Absolute path"))
                .required_property("content", PropertySchema::string("File content")),
        ),
        ToolDefinition::new("Edit", "Replace a string in a file").with_schema(
            ToolSchema::object()
                .required_property("file_path", PropertySchema::string("Absolute path"))
                .required_property("old_string", PropertySchema::string("Text to replace"))
                .required_property("new_string", PropertySchema::string("Replacement text"))
                .property(
                    "replace_all",
                    PropertySchema::new("boolean", "Replace every occurrence"),
                ),
        ),
        ToolDefinition::new("MultiEdit", "Apply several edits to one file").with_schema(
            ToolSchema::object()
                .required_property("file_path", PropertySchema::string("Absolute path"))
                .required_property(
                    "edits",
                    PropertySchema::new("array", "Edits to apply in order"),
                ),
        ),
        ToolDefinition::new("Bash", "Execute a shell command").with_schema(
            ToolSchema::object()
                .required_property("command", PropertySchema::string("Command to run"))
                .property("description", PropertySchema::string("What the command does"))
                .property("timeout", PropertySchema::new("number", "Timeout in ms")),
        ),
        ToolDefinition::new("Grep", "Search file contents with a regex").with_schema(
            ToolSchema::object()
                .required_property("pattern", PropertySchema::string("Regex to search for"))
                .property("path", PropertySchema::string("Directory or file to search"))
                .property("glob", PropertySchema::string("File filter"))
                .property("output_mode", PropertySchema::string("content, files_with_matches or count"))
                .property("-i", PropertySchema::new("boolean", "Case insensitive")),
        ),
        ToolDefinition::new("Glob", "Find files by glob pattern").with_schema(
            ToolSchema::object()
                .required_property("pattern", PropertySchema::string("Glob pattern"))
                .property("path", PropertySchema::string("Directory to search")),
        ),
        ToolDefinition::new("LS", "List a directory").with_schema(
            ToolSchema::object()
                .required_property("path", PropertySchema::string("Absolute directory path"))
                .property("ignore", PropertySchema::new("array", "Glob patterns to ignore")),
        ),
        ToolDefinition::new("TodoWrite", "Create and manage a structured task list").with_schema(
            ToolSchema::object().required_property(
                "todos",
                PropertySchema::new("array", "The updated task list").with_items(todo_item_schema()),
            ),
        ),
        ToolDefinition::new("WebSearch", "Search the web").with_schema(
            ToolSchema::object()
                .required_property("query", PropertySchema::string("Search query"))
                .property("allowed_domains", PropertySchema::new("array", "Only these domains"))
                .property("blocked_domains", PropertySchema::new("array", "Never these domains")),
        ),
        ToolDefinition::new("WebFetch", "Fetch a URL and process its content").with_schema(
            ToolSchema::object()
                .required_property("url", PropertySchema::string("URL to fetch"))
                .required_property("prompt", PropertySchema::string("What to extract")),
        ),
        ToolDefinition::new(
            "ExitPlanMode",
            "Signal that planning is finished and present the plan for approval",
        )
        .with_schema(
            ToolSchema::object()
                .required_property("plan", PropertySchema::string("The plan to present")),
        ),
        ToolDefinition::new("Task", "Launch a sub-agent for a self-contained task").with_schema(
            ToolSchema::object()
                .required_property("description", PropertySchema::string("Short task summary"))
                .required_property("prompt", PropertySchema::string("Full task instructions"))
                .property("subagent_type", PropertySchema::string("Agent flavour")),
        ),
    ]
}
