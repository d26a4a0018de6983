//! Port for the pipeline decision audit trail.
//!
//! Defines the [`DecisionLogger`] trait for recording every decision the
//! pipeline takes (loop short-circuits, tool filtering, corrections, guard
//! blocks) as structured records.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures a machine-readable
//! trail (JSONL) that can be replayed when tuning rules.

use serde_json::Value;

/// Event type identifiers.
pub mod events {
    pub const LOOP_DETECTED: &str = "loop_detected";
    pub const TOOLS_FILTERED: &str = "tools_filtered";
    pub const TOOL_CHOICE: &str = "tool_choice";
    pub const TOOL_CALL_CORRECTED: &str = "tool_call_corrected";
    pub const TOOL_CALL_ISSUE: &str = "tool_call_issue";
    pub const PLAN_EXIT_BLOCKED: &str = "plan_exit_blocked";
    pub const ADJUDICATOR_FALLBACK: &str = "adjudicator_fallback";
}

/// A structured pipeline decision.
#[derive(Debug, Clone)]
pub struct DecisionEvent {
    /// One of the [`events`] constants.
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl DecisionEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging decision events.
///
/// `log` is synchronous and infallible: a failing audit sink must never
/// change the outcome of a request.
pub trait DecisionLogger: Send + Sync {
    fn log(&self, event: DecisionEvent);
}

/// No-op implementation for tests and when the audit trail is disabled.
pub struct NoDecisionLogger;

impl DecisionLogger for NoDecisionLogger {
    fn log(&self, _event: DecisionEvent) {}
}
