//! Configuration value objects for the domain layer
//!
//! Shared by the infrastructure config loader and the CLI.

pub mod validation;

pub use validation::{ConfigIssue, ConfigIssueCode, Severity};
