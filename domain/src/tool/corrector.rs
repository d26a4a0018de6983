//! Structural corrector: field-preserving repair of malformed tool calls.
//!
//! The corrector only ever *renames a value into an absent key*. It never
//! overwrites a key that already exists and never fabricates content, so an
//! existing valid value (a todo item's `status`, say) survives repair
//! byte-for-byte. Anything it cannot repair under that rule is left for
//! validation to report.
//!
//! When the call's schema is known, an alias is only renamed if the schema
//! declares the canonical key and does not declare the alias itself. A tool
//! whose own schema takes `path` keeps its `path`.
//!
//! # Repairs
//!
//! | Tool | Repair |
//! |------|--------|
//! | `TodoWrite` | `todos` given as a JSON string is decoded into an array |
//! | `TodoWrite` | item text under `task`/`description`/`text`/`title`/... → `content` |
//! | any | top-level parameter aliases (`Read.path` → `file_path`, ...) |

use super::entities::{TODO_WRITE, ToolCall, ToolSchema};
use serde_json::{Map, Value};

/// Keys a model may use for a todo item's text, in preference order.
const TODO_CONTENT_ALIASES: &[&str] = &["task", "description", "text", "title", "name", "todo"];

/// Canonical key for a todo item's text.
const TODO_CONTENT_KEY: &str = "content";

/// Per-tool top-level parameter aliases: (tool, alias, canonical).
const PARAMETER_ALIASES: &[(&str, &str, &str)] = &[
    ("Read", "path", "file_path"),
    ("Read", "file", "file_path"),
    ("Read", "filename", "file_path"),
    ("Read", "filepath", "file_path"),
    ("Write", "path", "file_path"),
    ("Write", "file", "file_path"),
    ("Write", "filename", "file_path"),
    ("Write", "text", "content"),
    ("Write", "contents", "content"),
    ("Edit", "path", "file_path"),
    ("Edit", "file", "file_path"),
    ("Edit", "old", "old_string"),
    ("Edit", "new", "new_string"),
    ("Edit", "old_str", "old_string"),
    ("Edit", "new_str", "new_string"),
    ("MultiEdit", "path", "file_path"),
    ("Bash", "cmd", "command"),
    ("Bash", "script", "command"),
    ("Grep", "regex", "pattern"),
    ("Grep", "query", "pattern"),
    ("Grep", "search", "pattern"),
    ("Glob", "glob", "pattern"),
    ("LS", "dir", "path"),
    ("LS", "directory", "path"),
    ("WebSearch", "q", "query"),
    ("WebSearch", "search", "query"),
    ("WebFetch", "link", "url"),
    ("WebFetch", "uri", "url"),
    ("ExitPlanMode", "plan_text", "plan"),
    ("ExitPlanMode", "summary", "plan"),
    ("TodoWrite", "tasks", "todos"),
    ("TodoWrite", "items", "todos"),
];

/// Deterministic, field-preserving repair of tool-call arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralCorrector;

impl StructuralCorrector {
    /// Repair `call` against its resolved `schema`, returning the corrected
    /// copy and whether anything changed. When nothing needed fixing the
    /// original call is returned unmodified.
    pub fn correct(&self, call: ToolCall, schema: Option<&ToolSchema>) -> (ToolCall, bool) {
        let mut corrected = call;
        let mut fixed = self.apply_parameter_aliases(&mut corrected, schema);

        if corrected.name == TODO_WRITE {
            let item_schema = schema
                .and_then(|s| s.properties.get("todos"))
                .and_then(|p| p.items.as_deref());
            fixed |= self.correct_todos(&mut corrected, item_schema);
        }

        (corrected, fixed)
    }

    fn apply_parameter_aliases(&self, call: &mut ToolCall, schema: Option<&ToolSchema>) -> bool {
        let mut fixed = false;
        for (tool, alias, canonical) in PARAMETER_ALIASES {
            if call.name != *tool
                || call.input.contains_key(*canonical)
                || !alias_renamable(schema, alias, canonical)
            {
                continue;
            }
            if let Some(value) = call.input.remove(*alias) {
                call.input.insert((*canonical).to_string(), value);
                fixed = true;
            }
        }
        fixed
    }

    fn correct_todos(&self, call: &mut ToolCall, item_schema: Option<&ToolSchema>) -> bool {
        let mut fixed = false;

        if let Some(Value::String(encoded)) = call.input.get("todos")
            && let Ok(decoded @ Value::Array(_)) = serde_json::from_str::<Value>(encoded)
        {
            call.input.insert("todos".to_string(), decoded);
            fixed = true;
        }

        if let Some(Value::Array(items)) = call.input.get_mut("todos") {
            for item in items.iter_mut() {
                if let Value::Object(fields) = item {
                    fixed |= rename_content_alias(fields, item_schema);
                }
            }
        }

        fixed
    }
}

/// Whether `schema` allows renaming `alias` to `canonical`. Without a schema
/// the alias table applies as is.
fn alias_renamable(schema: Option<&ToolSchema>, alias: &str, canonical: &str) -> bool {
    match schema {
        Some(schema) => declares(schema, canonical) && !declares(schema, alias),
        None => true,
    }
}

fn declares(schema: &ToolSchema, key: &str) -> bool {
    schema.has_property(key) || schema.is_required(key)
}

/// Move the first content alias into `content` when `content` is absent.
///
/// All other fields are left exactly as they are.
fn rename_content_alias(fields: &mut Map<String, Value>, item_schema: Option<&ToolSchema>) -> bool {
    if fields.contains_key(TODO_CONTENT_KEY) {
        return false;
    }
    let Some(alias) = TODO_CONTENT_ALIASES
        .iter()
        .filter(|alias| alias_renamable(item_schema, alias, TODO_CONTENT_KEY))
        .find(|alias| matches!(fields.get(**alias), Some(Value::String(_))))
    else {
        return false;
    };
    match fields.remove(*alias) {
        Some(value) => {
            fields.insert(TODO_CONTENT_KEY.to_string(), value);
            true
        }
        None => false,
    }
}
