//! JSON fixtures read by the `pre-forward` and `post-response` commands.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use toolguard_application::BackendResponse;
use toolguard_domain::{Message, ToolCall, ToolDefinition};

/// A normalized chat request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestFixture {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
}

/// A backend response before post-processing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResponseFixture {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: Option<String>,
}

impl From<ResponseFixture> for BackendResponse {
    fn from(fixture: ResponseFixture) -> Self {
        let mut response = BackendResponse::new(fixture.content, fixture.tool_calls);
        if let Some(reason) = fixture.stop_reason {
            response.stop_reason = Some(reason);
        }
        response
    }
}

pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fixture_defaults() {
        let request: RequestFixture =
            serde_json::from_str(r#"{"messages": [{"role": "user", "content": "hi"}]}"#).unwrap();
        assert_eq!(request.messages.len(), 1);
        assert!(request.messages[0].is_user());
        assert!(request.tools.is_empty());
    }

    #[test]
    fn test_response_fixture_into_backend_response() {
        let fixture: ResponseFixture = serde_json::from_str(
            r#"{
                "content": "Reading it now.",
                "tool_calls": [{"id": "t1", "name": "Read", "input": {"file_path": "/a"}}],
                "stop_reason": "tool_use"
            }"#,
        )
        .unwrap();

        let response: BackendResponse = fixture.into();
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "Read");
        assert_eq!(response.stop_reason.as_deref(), Some("tool_use"));
    }

    #[test]
    fn test_read_json_reports_path() {
        let dir = std::env::temp_dir().join("toolguard-missing-fixture.json");
        let err = read_json::<RequestFixture>(&dir).unwrap_err();
        assert!(err.to_string().contains("toolguard-missing-fixture.json"));
    }
}
