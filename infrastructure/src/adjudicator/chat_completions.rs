//! Plan-exit adjudicator over an OpenAI-compatible chat-completions API.
//!
//! The model is shown the plan, a compact transcript of the recent
//! conversation and what the heuristics concluded, and must answer with a
//! single JSON object `{"block": bool, "reason": string}`.

use crate::config::FileAdjudicatorConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use toolguard_application::{
    AdjudicationRequest, AdjudicatorError, AdjudicatorVerdict, PlanExitAdjudicator,
};
use toolguard_domain::{Message, Role, truncate};
use tracing::debug;

const SYSTEM_PROMPT: &str = "You review calls to ExitPlanMode, the tool an assistant uses to \
present a plan for approval before it starts changing anything. The call is premature when the \
work is already done (the plan reports results instead of proposing steps) or when the \
assistant has been editing files and running commands instead of planning. A plan that lays \
out future steps after read-only research is legitimate. Answer with one JSON object and \
nothing else: {\"block\": true|false, \"reason\": \"one sentence\"}.";

/// Longest message body quoted in the transcript
const MAX_QUOTED_BYTES: usize = 400;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Adapter for the [`PlanExitAdjudicator`] port.
pub struct ChatCompletionsAdjudicator {
    client: reqwest::Client,
    model: String,
    endpoint: String,
    api_key: Option<String>,
}

impl ChatCompletionsAdjudicator {
    pub fn new(
        model: impl Into<String>,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AdjudicatorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdjudicatorError::NotConfigured(e.to_string()))?;

        Ok(Self {
            client,
            model: model.into(),
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Build from the `[adjudicator]` section. The API key is optional so
    /// local OpenAI-compatible servers work without one.
    pub fn from_config(config: &FileAdjudicatorConfig) -> Result<Self, AdjudicatorError> {
        if config.model.trim().is_empty() {
            return Err(AdjudicatorError::NotConfigured(
                "adjudicator.model is empty".to_string(),
            ));
        }
        if config.endpoint.trim().is_empty() {
            return Err(AdjudicatorError::NotConfigured(
                "adjudicator.endpoint is empty".to_string(),
            ));
        }
        Self::new(
            config.model.clone(),
            config.endpoint.clone(),
            config.resolve_api_key(),
            config.timeout(),
        )
    }

    fn chat_request<'a>(&'a self, request: &AdjudicationRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: render_prompt(request),
                },
            ],
            temperature: 0.0,
        }
    }
}

#[async_trait]
impl PlanExitAdjudicator for ChatCompletionsAdjudicator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn adjudicate(
        &self,
        request: &AdjudicationRequest,
    ) -> Result<AdjudicatorVerdict, AdjudicatorError> {
        let mut http = self
            .client
            .post(&self.endpoint)
            .json(&self.chat_request(request));
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdjudicatorError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate(body.trim(), 200)
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(map_reqwest_error)?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AdjudicatorError::InvalidVerdict("response has no choices".into()))?;

        debug!(model = %self.model, "Adjudicator answered: {}", truncate(&content, 200));
        parse_verdict(&content)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> AdjudicatorError {
    if e.is_timeout() {
        AdjudicatorError::Timeout
    } else if e.is_decode() {
        AdjudicatorError::InvalidVerdict(e.to_string())
    } else {
        AdjudicatorError::RequestFailed(e.to_string())
    }
}

/// Extract the verdict object from the model's answer.
///
/// Tolerates code fences and prose around the object.
pub fn parse_verdict(content: &str) -> Result<AdjudicatorVerdict, AdjudicatorError> {
    let trimmed = content.trim();
    if let Ok(verdict) = serde_json::from_str::<AdjudicatorVerdict>(trimmed) {
        return Ok(verdict);
    }

    let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) else {
        return Err(AdjudicatorError::InvalidVerdict(format!(
            "no JSON object in: {}",
            truncate(trimmed, 120)
        )));
    };
    if end < start {
        return Err(AdjudicatorError::InvalidVerdict(format!(
            "no JSON object in: {}",
            truncate(trimmed, 120)
        )));
    }

    serde_json::from_str(&trimmed[start..=end])
        .map_err(|e| AdjudicatorError::InvalidVerdict(e.to_string()))
}

fn render_prompt(request: &AdjudicationRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Proposed plan\n{}\n", request.plan.trim());

    let _ = writeln!(out, "## Recent conversation");
    for message in &request.recent_messages {
        render_message(&mut out, message);
    }

    let _ = writeln!(
        out,
        "\n## Signals\ncontent: {:?}\nimplementation calls: {}\nresearch calls: {}\nactivity: {:?}\nheuristic verdict: {}",
        request.content,
        request.activity.implementation,
        request.activity.research,
        request.activity.signal,
        if request.heuristic.should_block {
            "block"
        } else {
            "allow"
        },
    );
    out
}

fn render_message(out: &mut String, message: &Message) {
    let role = match message.role {
        Role::System => return,
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };
    if !message.content.trim().is_empty() {
        let _ = writeln!(
            out,
            "[{role}] {}",
            truncate(message.content.trim(), MAX_QUOTED_BYTES)
        );
    }
    for call in &message.tool_calls {
        let _ = writeln!(out, "[{role}] called {}", call.name);
    }
    for result in &message.tool_results {
        let status = if result.is_error { "error" } else { "ok" };
        let _ = writeln!(out, "[{role}] result {} ({status})", result.tool_call_id);
    }
}
