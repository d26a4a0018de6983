//! Adapters for the plan-exit adjudicator port

mod chat_completions;

pub use chat_completions::{ChatCompletionsAdjudicator, parse_verdict};
