//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod pipeline;
pub mod plan_exit_guard;
