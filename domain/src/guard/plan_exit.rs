//! Heuristic half of the plan-exit misuse guard.
//!
//! Models like to call `ExitPlanMode` after the work is finished, with a
//! summary of what they did as the "plan". [`PlanExitGuard::assess`] settles
//! the fixed edge cases and otherwise produces the heuristic verdict the
//! application layer falls back to when the adjudicator is unavailable.

use super::activity::{ActivitySignal, ActivitySummary};
use super::content::{ContentSignal, classify_plan_content, completion_indicator};
use crate::conversation::Message;
use crate::tool::entities::ToolCall;
use serde::{Deserialize, Serialize};

/// Prefix of every reason produced by a blocking guard decision.
pub const PLAN_EXIT_GUARD_MARKER: &str = "[plan-exit-guard]";

/// Input key that carries the plan text.
pub const PLAN_PARAM: &str = "plan";

/// Tunables for the activity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardPolicy {
    /// Trailing messages inspected for tool activity
    pub activity_window: usize,
    /// Implementation calls needed before activity alone can block
    pub min_implementation_calls: usize,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            activity_window: 20,
            min_implementation_calls: 3,
        }
    }
}

/// Outcome of the guard for one plan-exit call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardDecision {
    pub should_block: bool,
    /// Empty when allowing; starts with [`PLAN_EXIT_GUARD_MARKER`] when blocking
    pub reason: String,
}

impl GuardDecision {
    pub fn allow() -> Self {
        Self {
            should_block: false,
            reason: String::new(),
        }
    }

    /// Blocking decision. The marker is prepended unless already present.
    pub fn block(reason: impl AsRef<str>) -> Self {
        let reason = reason.as_ref().trim();
        let reason = if reason.starts_with(PLAN_EXIT_GUARD_MARKER) {
            reason.to_string()
        } else if reason.is_empty() {
            format!("{PLAN_EXIT_GUARD_MARKER} plan-exit call blocked")
        } else {
            format!("{PLAN_EXIT_GUARD_MARKER} {reason}")
        };
        Self {
            should_block: true,
            reason,
        }
    }
}

/// Signals computed for a plan that needs judging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicAssessment {
    pub plan: String,
    pub content: ContentSignal,
    pub activity: ActivitySummary,
    /// What signals 1 and 2 conclude on their own
    pub verdict: GuardDecision,
}

/// Result of [`PlanExitGuard::assess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanExitAssessment {
    /// A fixed edge case decided the outcome; nothing to adjudicate.
    Settled(GuardDecision),
    /// Heuristics ran; an adjudicator may override [`HeuristicAssessment::verdict`].
    Open(HeuristicAssessment),
}

impl PlanExitAssessment {
    /// The decision to use when no adjudicator answers.
    pub fn fallback(&self) -> &GuardDecision {
        match self {
            PlanExitAssessment::Settled(decision) => decision,
            PlanExitAssessment::Open(assessment) => &assessment.verdict,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanExitGuard {
    policy: GuardPolicy,
}

impl PlanExitGuard {
    pub fn new(policy: GuardPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &GuardPolicy {
        &self.policy
    }

    /// Run the edge cases and both heuristic signals.
    ///
    /// Edge cases, in order: missing or non-string plan allows, blank plan
    /// blocks, empty history allows.
    pub fn assess(&self, call: &ToolCall, messages: &[Message]) -> PlanExitAssessment {
        let Some(plan) = call.get_string(PLAN_PARAM) else {
            return PlanExitAssessment::Settled(GuardDecision::allow());
        };
        if plan.trim().is_empty() {
            return PlanExitAssessment::Settled(GuardDecision::block(
                "ExitPlanMode called with an empty plan; present the plan before leaving plan mode",
            ));
        }
        if messages.is_empty() {
            return PlanExitAssessment::Settled(GuardDecision::allow());
        }

        let content = classify_plan_content(plan);
        let activity = ActivitySummary::of(
            messages,
            self.policy.activity_window,
            self.policy.min_implementation_calls,
        );
        let verdict = heuristic_verdict(plan, content, &activity);

        PlanExitAssessment::Open(HeuristicAssessment {
            plan: plan.to_string(),
            content,
            activity,
            verdict,
        })
    }

    /// Heuristic-only decision, without an adjudicator.
    pub fn evaluate(&self, call: &ToolCall, messages: &[Message]) -> GuardDecision {
        self.assess(call, messages).fallback().clone()
    }
}

fn heuristic_verdict(plan: &str, content: ContentSignal, activity: &ActivitySummary) -> GuardDecision {
    match (content, activity.signal) {
        (ContentSignal::Completion, _) => {
            let indicator = completion_indicator(plan).unwrap_or_default();
            GuardDecision::block(format!(
                "plan reads as a completion summary (found \"{indicator}\"); \
                 ExitPlanMode presents a plan before implementation, not a report afterwards"
            ))
        }
        (ContentSignal::Neutral, ActivitySignal::ImplementationDominant) => {
            GuardDecision::block(format!(
                "{} implementation tool calls against {} research calls in the recent \
                 conversation; the work is already underway, so there is no plan to exit",
                activity.implementation, activity.research
            ))
        }
        _ => GuardDecision::allow(),
    }
}
