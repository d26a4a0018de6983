//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// # Example
///
/// ```toml
/// [logging]
/// debug = true
/// decision_log = "toolguard-decisions.jsonl"
/// file = "toolguard.log"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Raise the tracing level to `debug`
    pub debug: bool,
    /// JSONL audit trail of pipeline decisions
    pub decision_log: Option<PathBuf>,
    /// Write tracing output to this file instead of stderr
    pub file: Option<PathBuf>,
}
