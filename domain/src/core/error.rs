//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid tool name: '{0}'")]
    InvalidToolName(String),

    #[error("Invalid schema for tool '{0}': {1}")]
    InvalidToolSchema(String, String),
}
