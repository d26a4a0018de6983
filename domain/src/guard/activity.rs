//! Activity signal: what has the assistant been doing lately?

use crate::conversation::{Message, trailing};
use crate::tool::entities::ToolClass;
use crate::tool::validator::ToolValidator;
use serde::{Deserialize, Serialize};

/// Dominant tool activity in the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySignal {
    ImplementationDominant,
    ResearchDominant,
    Idle,
}

/// Tool-call counts over the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub implementation: usize,
    pub research: usize,
    pub signal: ActivitySignal,
}

impl ActivitySummary {
    /// Count tool calls in the last `window` messages.
    ///
    /// Names are normalized first so `bash` or `write_file` count the same
    /// as their canonical forms; unknown names count as neither.
    pub fn of(messages: &[Message], window: usize, min_implementation_calls: usize) -> Self {
        let validator = ToolValidator;
        let (implementation, research) = trailing(messages, window)
            .iter()
            .flat_map(|m| &m.tool_calls)
            .map(|call| {
                validator
                    .normalize_tool_name(&call.name)
                    .map(|name| ToolClass::of(&name))
                    .unwrap_or_else(|| ToolClass::of(&call.name))
            })
            .fold((0, 0), |(i, r), class| match class {
                ToolClass::Implementation => (i + 1, r),
                ToolClass::Research => (i, r + 1),
                ToolClass::Neutral => (i, r),
            });

        let signal = if implementation > research && implementation >= min_implementation_calls {
            ActivitySignal::ImplementationDominant
        } else if research >= implementation && research > 0 {
            ActivitySignal::ResearchDominant
        } else {
            ActivitySignal::Idle
        };

        Self {
            implementation,
            research,
            signal,
        }
    }
}
