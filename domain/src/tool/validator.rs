//! Structural validation of tool calls and tool-name normalization.
//!
//! Validation is pure: it never mutates the call and never touches I/O.
//! Backend models frequently use snake_case or hallucinated names
//! (`read_file`, `bash`, `web_search`); [`ToolValidator::normalize_tool_name`]
//! maps those back to canonical names without guessing beyond a fixed table.

use super::entities::{ToolCall, ToolSchema};
use super::registry::SchemaRegistry;
use serde::{Deserialize, Serialize};

/// Alias key (lowercase, `_`/`-`/space stripped) → canonical tool name.
const TOOL_ALIASES: &[(&str, &str)] = &[
    ("read", "Read"),
    ("readfile", "Read"),
    ("view", "Read"),
    ("cat", "Read"),
    ("write", "Write"),
    ("writefile", "Write"),
    ("createfile", "Write"),
    ("edit", "Edit"),
    ("editfile", "Edit"),
    ("strreplace", "Edit"),
    ("multiedit", "MultiEdit"),
    ("bash", "Bash"),
    ("shell", "Bash"),
    ("runcommand", "Bash"),
    ("execute", "Bash"),
    ("exec", "Bash"),
    ("grep", "Grep"),
    ("grepsearch", "Grep"),
    ("search", "Grep"),
    ("rg", "Grep"),
    ("glob", "Glob"),
    ("globsearch", "Glob"),
    ("findfiles", "Glob"),
    ("ls", "LS"),
    ("listdir", "LS"),
    ("listdirectory", "LS"),
    ("listfiles", "LS"),
    ("todowrite", "TodoWrite"),
    ("todo", "TodoWrite"),
    ("todos", "TodoWrite"),
    ("updatetodos", "TodoWrite"),
    ("websearch", "WebSearch"),
    ("searchweb", "WebSearch"),
    ("webfetch", "WebFetch"),
    ("fetch", "WebFetch"),
    ("fetchurl", "WebFetch"),
    ("exitplanmode", "ExitPlanMode"),
    ("exitplan", "ExitPlanMode"),
    ("task", "Task"),
];

/// Outcome of validating one tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Required parameters absent from the input, in schema order
    pub missing_params: Vec<String>,
    /// Input keys the schema does not declare, sorted
    pub invalid_params: Vec<String>,
    /// The name only matched after case folding or alias lookup
    pub has_name_case_issue: bool,
    /// The name matched nothing at all
    pub has_unknown_name_issue: bool,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    /// Human-readable summary, empty when valid.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.has_unknown_name_issue {
            parts.push("unknown tool name".to_string());
        }
        if self.has_name_case_issue {
            parts.push("non-canonical tool name".to_string());
        }
        if !self.missing_params.is_empty() {
            parts.push(format!("missing: {}", self.missing_params.join(", ")));
        }
        if !self.invalid_params.is_empty() {
            parts.push(format!("unexpected: {}", self.invalid_params.join(", ")));
        }
        parts.join("; ")
    }
}

/// Validator for tool calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolValidator;

impl ToolValidator {
    /// Check `call.input` against `schema`.
    pub fn validate_parameters(&self, call: &ToolCall, schema: &ToolSchema) -> ValidationResult {
        let missing_params: Vec<String> = schema
            .required
            .iter()
            .filter(|name| !call.input.contains_key(name.as_str()))
            .cloned()
            .collect();

        let mut invalid_params: Vec<String> = call
            .input
            .keys()
            .filter(|key| !schema.has_property(key))
            .cloned()
            .collect();
        invalid_params.sort();

        ValidationResult {
            is_valid: missing_params.is_empty() && invalid_params.is_empty(),
            missing_params,
            invalid_params,
            has_name_case_issue: false,
            has_unknown_name_issue: false,
        }
    }

    /// Resolve `name` to a canonical tool name from the fixed alias table.
    ///
    /// Exact canonical names win, then case-insensitive matches, then
    /// aliases with `_`, `-` and spaces ignored. Unknown names give `None`.
    pub fn normalize_tool_name(&self, name: &str) -> Option<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        if TOOL_ALIASES.iter().any(|(_, canonical)| *canonical == trimmed) {
            return Some(trimmed.to_string());
        }
        if let Some((_, canonical)) = TOOL_ALIASES
            .iter()
            .find(|(_, canonical)| canonical.eq_ignore_ascii_case(trimmed))
        {
            return Some((*canonical).to_string());
        }

        let key = alias_key(trimmed);
        TOOL_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| (*canonical).to_string())
    }

    /// Resolve a name against the registry first, then the alias table.
    ///
    /// Registry lookup covers caller-registered tools whose names are not in
    /// the alias table; the returned flag is `true` when the name had to be
    /// rewritten.
    pub fn resolve_name(&self, name: &str, registry: &SchemaRegistry) -> Option<(String, bool)> {
        if registry.get_schema(name).is_some() {
            return Some((name.to_string(), false));
        }
        if let Some(registered) = registry
            .list_tools()
            .into_iter()
            .find(|registered| registered.eq_ignore_ascii_case(name.trim()))
        {
            return Some((registered, true));
        }
        self.normalize_tool_name(name)
            .map(|canonical| {
                let rewritten = canonical != name;
                (canonical, rewritten)
            })
    }

    /// Full validation of a call: name resolution plus parameter checks.
    pub fn validate_call(&self, call: &ToolCall, registry: &SchemaRegistry) -> ValidationResult {
        let Some((canonical, rewritten)) = self.resolve_name(&call.name, registry) else {
            return ValidationResult {
                is_valid: false,
                has_unknown_name_issue: true,
                ..ValidationResult::default()
            };
        };

        let Some(schema) = registry.get_schema(&canonical) else {
            // Known alias whose schema was never registered: nothing to check against
            return ValidationResult {
                is_valid: !rewritten,
                has_name_case_issue: rewritten,
                ..ValidationResult::default()
            };
        };

        let mut result = self.validate_parameters(call, &schema);
        if rewritten {
            result.has_name_case_issue = true;
            result.is_valid = false;
        }
        result
    }
}

fn alias_key(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}
