//! Domain layer for toolguard
//!
//! Pure, synchronous logic of the tool-call correction and conversation
//! safety pipeline. No I/O and no async: the adjudicator call and
//! everything else with side effects lives in the outer layers.
//!
//! # Core Concepts
//!
//! ## Tool calls
//!
//! - [`SchemaRegistry`]: canonical tool name → parameter schema
//! - [`ToolValidator`]: missing/unknown parameters, name normalization
//! - [`StructuralCorrector`]: field-preserving repair of malformed calls
//!
//! ## Conversation safety
//!
//! - [`RuleEngine`]: does this request need tools at all?
//! - [`PlanExitGuard`]: heuristics against premature `ExitPlanMode` calls
//! - [`LoopDetector`]: repeating tool-call patterns

pub mod config;
pub mod conversation;
pub mod core;
pub mod guard;
pub mod intent;
pub mod loop_detection;
pub mod tool;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use conversation::{Message, Role, ToolResultRef, latest_user_text, trailing};
pub use crate::core::{error::DomainError, string::truncate};
pub use guard::{
    ActivitySignal, ActivitySummary, ContentSignal, GuardDecision, GuardPolicy,
    HeuristicAssessment, PLAN_EXIT_GUARD_MARKER, PlanExitAssessment, PlanExitGuard,
};
pub use intent::{
    ActionPair, Intent, Rule, RuleDecision, RuleEngine, extract_action_pairs, filter_tools,
    should_force_tool_choice,
};
pub use loop_detection::{LoopDetection, LoopDetector, LoopEvidence, LoopPolicy, LoopType};
pub use tool::{
    EXIT_PLAN_MODE, PropertySchema, SchemaRegistry, StructuralCorrector, TODO_WRITE, ToolCall,
    ToolClass, ToolDefinition, ToolSchema, ToolValidator, ValidationResult,
};
