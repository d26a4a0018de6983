//! Logging infrastructure: the decision audit trail.
//!
//! Provides [`JsonlDecisionLogger`], a JSONL file writer that implements
//! the [`DecisionLogger`](toolguard_application::DecisionLogger) port.

mod jsonl_decision_logger;

pub use jsonl_decision_logger::JsonlDecisionLogger;
