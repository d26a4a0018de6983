//! Intent classification: does this request need tools?

pub mod action;
pub mod builtin;
pub mod engine;
pub mod filter;
pub mod rule;

pub use action::{ActionPair, VerbKind, extract_action_pairs};
pub use builtin::builtin_rules;
pub use engine::RuleEngine;
pub use filter::{filter_tools, should_force_tool_choice};
pub use rule::{Intent, PairCounts, Rule, RuleDecision};
