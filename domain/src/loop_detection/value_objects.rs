//! Loop detection results

use crate::conversation::Message;
use serde::{Deserialize, Serialize};

/// Pattern family of a detected loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopType {
    /// Same signature N turns in a row
    ConsecutiveIdentical,
    /// A short cycle of distinct signatures, repeated
    AlternatingPattern,
}

impl LoopType {
    pub fn as_str(&self) -> &str {
        match self {
            LoopType::ConsecutiveIdentical => "consecutive_identical",
            LoopType::AlternatingPattern => "alternating_pattern",
        }
    }

    fn describe(&self) -> &str {
        match self {
            LoopType::ConsecutiveIdentical => "the same tool call repeated",
            LoopType::AlternatingPattern => "a repeating cycle of tool calls",
        }
    }
}

impl std::fmt::Display for LoopType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopEvidence {
    /// Consecutive identical turns, or full cycles
    pub repetitions: usize,
    /// Assistant tool-call turns inside the window
    pub turns_examined: usize,
    /// The repeating signature(s), truncated
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopDetection {
    pub has_loop: bool,
    pub loop_type: Option<LoopType>,
    /// Tool(s) implicated, comma separated
    pub tool_name: String,
    pub evidence: LoopEvidence,
}

impl LoopDetection {
    pub fn none(turns_examined: usize) -> Self {
        Self {
            evidence: LoopEvidence {
                turns_examined,
                ..LoopEvidence::default()
            },
            ..Self::default()
        }
    }

    pub fn detected(loop_type: LoopType, tool_name: impl Into<String>, evidence: LoopEvidence) -> Self {
        Self {
            has_loop: true,
            loop_type: Some(loop_type),
            tool_name: tool_name.into(),
            evidence,
        }
    }

    /// Assistant message returned to the client instead of forwarding.
    ///
    /// `None` when no loop was detected.
    pub fn terminal_message(&self) -> Option<Message> {
        let loop_type = self.loop_type.filter(|_| self.has_loop)?;
        Some(Message::assistant(format!(
            "I stopped because I detected a tool-call loop ({}): {} of `{}` {} times without progress. \
             Please clarify the request or suggest a different approach.",
            loop_type,
            loop_type.describe(),
            self.tool_name,
            self.evidence.repetitions
        )))
    }
}
