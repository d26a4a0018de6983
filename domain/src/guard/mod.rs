//! Plan-exit misuse guard: content and activity heuristics.
//!
//! The adjudicator stage lives in the application layer; this module only
//! computes the signals and the deterministic fallback verdict.

pub mod activity;
pub mod content;
pub mod plan_exit;

pub use activity::{ActivitySignal, ActivitySummary};
pub use content::{ContentSignal, classify_plan_content, completion_indicator};
pub use plan_exit::{
    GuardDecision, GuardPolicy, HeuristicAssessment, PLAN_EXIT_GUARD_MARKER, PLAN_PARAM,
    PlanExitAssessment, PlanExitGuard,
};
