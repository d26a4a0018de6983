//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod decision_logger;
pub mod plan_exit_adjudicator;
