//! Tool-necessity rules.
//!
//! A [`Rule`] inspects the action pairs of the latest user message (and, if
//! it wants, the whole conversation) and either abstains (`None`) or returns
//! a [`RuleDecision`]. Only a decision with `confident = true` settles the
//! outcome; a non-confident match is recorded but evaluation continues.

use super::action::ActionPair;
use crate::conversation::Message;
use serde::{Deserialize, Serialize};

/// Dominant intent behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Reading, analysing, asking
    Research,
    /// Changing files or running things
    Implementation,
    /// Both, with implementation dominant
    Mixed,
    /// Writing documentation
    Documentation,
    /// No recognizable action
    #[default]
    Conversational,
}

impl Intent {
    pub fn as_str(&self) -> &str {
        match self {
            Intent::Research => "research",
            Intent::Implementation => "implementation",
            Intent::Mixed => "mixed",
            Intent::Documentation => "documentation",
            Intent::Conversational => "conversational",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decision about whether the backend should be forced to use tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDecision {
    pub require_tools: bool,
    pub confident: bool,
    pub reason: String,
    pub intent: Intent,
}

impl RuleDecision {
    /// Confident decision to require tools.
    pub fn require(intent: Intent, reason: impl Into<String>) -> Self {
        Self {
            require_tools: true,
            confident: true,
            reason: reason.into(),
            intent,
        }
    }

    /// Confident decision to leave tools optional.
    pub fn optional(intent: Intent, reason: impl Into<String>) -> Self {
        Self {
            require_tools: false,
            confident: true,
            reason: reason.into(),
            intent,
        }
    }

    /// Mark the decision as a tentative one.
    pub fn tentative(mut self) -> Self {
        self.confident = false;
        self
    }
}

/// A tool-necessity rule.
///
/// Rules are evaluated by descending [`priority`](Rule::priority); rules of
/// equal priority run in registration order.
pub trait Rule: Send + Sync {
    /// Higher runs first.
    fn priority(&self) -> i32;

    /// Stable identifier used in logs and decision reasons.
    fn name(&self) -> &str;

    /// Return `Some` when the rule matches.
    fn evaluate(&self, pairs: &[ActionPair], messages: &[Message]) -> Option<RuleDecision>;
}

impl std::fmt::Debug for dyn Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name())
            .field("priority", &self.priority())
            .finish()
    }
}

/// Counts of pair kinds, shared by the built-in rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairCounts {
    pub implementation: usize,
    pub research: usize,
    pub documentation: usize,
}

impl PairCounts {
    pub fn of(pairs: &[ActionPair]) -> Self {
        use super::action::VerbKind;
        pairs.iter().fold(Self::default(), |mut counts, pair| {
            match pair.kind {
                VerbKind::Implementation => counts.implementation += 1,
                VerbKind::Research => counts.research += 1,
                VerbKind::Documentation => counts.documentation += 1,
            }
            counts
        })
    }

    /// Intent implied by the raw counts, used when no rule is confident.
    pub fn dominant_intent(&self) -> Intent {
        let acting = self.implementation + self.documentation;
        match (acting, self.research) {
            (0, 0) => Intent::Conversational,
            (0, _) => Intent::Research,
            (_, 0) => Intent::Implementation,
            (a, r) if r > a => Intent::Research,
            _ => Intent::Mixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::action::extract_action_pairs;

    #[test]
    fn test_decision_constructors() {
        let d = RuleDecision::require(Intent::Implementation, "r");
        assert!(d.require_tools && d.confident);
        let d = RuleDecision::optional(Intent::Research, "r").tentative();
        assert!(!d.require_tools && !d.confident);
    }

    #[test]
    fn test_pair_counts() {
        let pairs = extract_action_pairs("read a.rs, check b.rs and fix c.rs");
        let counts = PairCounts::of(&pairs);
        assert_eq!(counts.research, 2);
        assert_eq!(counts.implementation, 1);
        assert_eq!(counts.dominant_intent(), Intent::Research);
    }

    #[test]
    fn test_dominant_intent() {
        let counts = |implementation, research| PairCounts {
            implementation,
            research,
            documentation: 0,
        };
        assert_eq!(counts(0, 0).dominant_intent(), Intent::Conversational);
        assert_eq!(counts(0, 2).dominant_intent(), Intent::Research);
        assert_eq!(counts(2, 0).dominant_intent(), Intent::Implementation);
        assert_eq!(counts(1, 1).dominant_intent(), Intent::Mixed);
        assert_eq!(counts(1, 3).dominant_intent(), Intent::Research);
    }
}
