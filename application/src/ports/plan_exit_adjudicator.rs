//! Plan-exit adjudicator port
//!
//! An LLM-backed judge that decides whether an `ExitPlanMode` call is
//! premature. When configured and reachable its verdict overrides the
//! heuristics; any error makes the guard fall back to them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use toolguard_domain::{ActivitySummary, ContentSignal, GuardDecision, Message};

/// Errors that can occur while consulting the adjudicator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdjudicatorError {
    #[error("Adjudicator not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid verdict: {0}")]
    InvalidVerdict(String),

    #[error("Timeout")]
    Timeout,

    #[error("Operation cancelled")]
    Cancelled,
}

/// Everything the adjudicator gets to see.
#[derive(Debug, Clone, Serialize)]
pub struct AdjudicationRequest {
    pub plan: String,
    /// Trailing slice of the conversation (the activity window)
    pub recent_messages: Vec<Message>,
    pub content: ContentSignal,
    pub activity: ActivitySummary,
    /// What the heuristics would decide on their own
    pub heuristic: GuardDecision,
}

/// The adjudicator's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicatorVerdict {
    pub block: bool,
    #[serde(default)]
    pub reason: String,
}

impl AdjudicatorVerdict {
    pub fn into_decision(self) -> GuardDecision {
        if !self.block {
            return GuardDecision::allow();
        }
        if self.reason.trim().is_empty() {
            GuardDecision::block("adjudicator judged the plan-exit call premature")
        } else {
            GuardDecision::block(format!("adjudicator: {}", self.reason.trim()))
        }
    }
}

/// Port for the plan-exit adjudicator.
///
/// Implementations live in the infrastructure layer. The caller bounds every
/// call with a timeout and a cancellation token, so implementations need
/// not enforce their own deadline.
#[async_trait]
pub trait PlanExitAdjudicator: Send + Sync {
    /// Short identifier for logs (e.g. the model id)
    fn name(&self) -> &str;

    async fn adjudicate(
        &self,
        request: &AdjudicationRequest,
    ) -> Result<AdjudicatorVerdict, AdjudicatorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolguard_domain::PLAN_EXIT_GUARD_MARKER;

    #[test]
    fn test_verdict_into_decision() {
        let allow = AdjudicatorVerdict {
            block: false,
            reason: "looks like a plan".into(),
        }
        .into_decision();
        assert!(!allow.should_block);
        assert!(allow.reason.is_empty());

        let block = AdjudicatorVerdict {
            block: true,
            reason: "summary of finished work".into(),
        }
        .into_decision();
        assert!(block.should_block);
        assert!(block.reason.starts_with(PLAN_EXIT_GUARD_MARKER));
        assert!(block.reason.ends_with("summary of finished work"));
    }

    #[test]
    fn test_verdict_without_reason_still_explains() {
        let block = AdjudicatorVerdict {
            block: true,
            reason: String::new(),
        }
        .into_decision();
        assert!(block.reason.len() > PLAN_EXIT_GUARD_MARKER.len());
    }

    #[test]
    fn test_verdict_reason_is_optional_in_json() {
        let verdict: AdjudicatorVerdict = serde_json::from_str(r#"{"block": true}"#).unwrap();
        assert!(verdict.block);
        assert!(verdict.reason.is_empty());
    }
}
