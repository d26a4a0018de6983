//! Canonical call signatures.
//!
//! Two calls share a signature when they name the same tool with the same
//! arguments, regardless of key order or `2` vs `2.0`. Different values are
//! never merged: `offset: 100` and `offset: 200` are distinct signatures.
//! Tool names are normalized first, so `read` and `Read` are the same tool.

use crate::tool::entities::ToolCall;
use crate::tool::validator::ToolValidator;
use serde_json::{Map, Number, Value};

/// Signature of a single call: `name:{canonical json}`.
pub fn call_signature(call: &ToolCall) -> String {
    let mut keys: Vec<&String> = call.input.keys().collect();
    keys.sort();
    let mut object = Map::new();
    for key in keys {
        object.insert(key.clone(), canonicalize(&call.input[key]));
    }
    format!("{}:{}", canonical_tool_name(&call.name), Value::Object(object))
}

/// Canonical spelling of `name`, or `name` itself when it is not a known alias.
pub fn canonical_tool_name(name: &str) -> String {
    ToolValidator
        .normalize_tool_name(name)
        .unwrap_or_else(|| name.to_string())
}

/// Signature of an assistant turn: its call signatures, in order.
pub fn turn_signature(calls: &[ToolCall]) -> String {
    calls
        .iter()
        .map(call_signature)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Recursively sort object keys and collapse integral floats to integers.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Number(n) => Value::Number(canonical_number(n)),
        other => other.clone(),
    }
}

fn canonical_number(n: &Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n.clone();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Number::from(f as i64)
        }
        _ => n.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_is_irrelevant() {
        let a = ToolCall::new("Grep").with_arg("pattern", "foo").with_arg("path", "src");
        let b = ToolCall::new("Grep").with_arg("path", "src").with_arg("pattern", "foo");
        assert_eq!(call_signature(&a), call_signature(&b));
    }

    #[test]
    fn test_nested_objects_are_sorted() {
        let a = canonicalize(&json!({"b": {"y": 1, "x": [ {"d": 1, "c": 2} ]}, "a": 0}));
        assert_eq!(a.to_string(), r#"{"a":0,"b":{"x":[{"c":2,"d":1}],"y":1}}"#);
    }

    #[test]
    fn test_integral_floats_collapse() {
        let a = ToolCall::new("Read").with_arg("offset", 100);
        let b = ToolCall::new("Read").with_arg("offset", 100.0);
        assert_eq!(call_signature(&a), call_signature(&b));
        let c = ToolCall::new("Read").with_arg("offset", 100.5);
        assert_ne!(call_signature(&a), call_signature(&c));
    }

    #[test]
    fn test_different_values_stay_distinct() {
        let a = ToolCall::new("Read").with_arg("offset", 100);
        let b = ToolCall::new("Read").with_arg("offset", 200);
        assert_ne!(call_signature(&a), call_signature(&b));
    }

    #[test]
    fn test_name_is_part_of_signature() {
        let a = ToolCall::new("Read").with_arg("file_path", "/a");
        let b = ToolCall::new("Write").with_arg("file_path", "/a");
        assert_ne!(call_signature(&a), call_signature(&b));
    }

    #[test]
    fn test_name_spelling_is_normalized() {
        let a = ToolCall::new("Read").with_arg("file_path", "/a");
        let b = ToolCall::new("read").with_arg("file_path", "/a");
        let c = ToolCall::new("read_file").with_arg("file_path", "/a");
        assert_eq!(call_signature(&a), call_signature(&b));
        assert_eq!(call_signature(&a), call_signature(&c));
        assert!(call_signature(&b).starts_with("Read:"));
    }

    #[test]
    fn test_unknown_name_is_kept() {
        let call = ToolCall::new("deploy_service");
        assert_eq!(call_signature(&call), "deploy_service:{}");
    }

    #[test]
    fn test_turn_signature_keeps_call_order() {
        let read = ToolCall::new("Read");
        let grep = ToolCall::new("Grep");
        assert_ne!(
            turn_signature(&[read.clone(), grep.clone()]),
            turn_signature(&[grep, read])
        );
    }
}
