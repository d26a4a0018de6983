//! Application layer for toolguard
//!
//! This crate contains the pipeline use cases, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use ports::{
    decision_logger::{DecisionEvent, DecisionLogger, NoDecisionLogger},
    plan_exit_adjudicator::{
        AdjudicationRequest, AdjudicatorError, AdjudicatorVerdict, PlanExitAdjudicator,
    },
};
pub use use_cases::pipeline::{
    BackendResponse, BlockedCall, CallIssue, CorrectionReport, PipelineBuilder, PreForward,
    ToolCallPipeline, ToolPolicy,
};
pub use use_cases::plan_exit_guard::{DecisionSource, ValidateExitPlanModeUseCase};
