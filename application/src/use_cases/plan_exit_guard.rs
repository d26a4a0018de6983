//! Validate ExitPlanMode use case
//!
//! Two-stage evaluation: the heuristic verdict is computed eagerly, then the
//! adjudicator (if any) is raced against its deadline and the caller's
//! cancellation token. Whatever happens to the adjudicator call, the request
//! gets a decision.

use crate::ports::decision_logger::{DecisionEvent, DecisionLogger, NoDecisionLogger, events};
use crate::ports::plan_exit_adjudicator::{
    AdjudicationRequest, AdjudicatorError, PlanExitAdjudicator,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use toolguard_domain::{
    GuardDecision, GuardPolicy, Message, PlanExitAssessment, PlanExitGuard, ToolCall, trailing,
};
use tracing::{debug, info, warn};

/// Where a guard decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    EdgeCase,
    Heuristic,
    Adjudicator,
}

impl DecisionSource {
    pub fn as_str(&self) -> &str {
        match self {
            DecisionSource::EdgeCase => "edge_case",
            DecisionSource::Heuristic => "heuristic",
            DecisionSource::Adjudicator => "adjudicator",
        }
    }
}

pub struct ValidateExitPlanModeUseCase {
    guard: PlanExitGuard,
    adjudicator: Option<Arc<dyn PlanExitAdjudicator>>,
    timeout: Duration,
    logger: Arc<dyn DecisionLogger>,
}

impl ValidateExitPlanModeUseCase {
    pub fn new(policy: GuardPolicy) -> Self {
        Self {
            guard: PlanExitGuard::new(policy),
            adjudicator: None,
            timeout: Duration::from_millis(4000),
            logger: Arc::new(NoDecisionLogger),
        }
    }

    pub fn with_adjudicator(mut self, adjudicator: Arc<dyn PlanExitAdjudicator>) -> Self {
        self.adjudicator = Some(adjudicator);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn DecisionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn has_adjudicator(&self) -> bool {
        self.adjudicator.is_some()
    }

    pub async fn execute(
        &self,
        call: &ToolCall,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> GuardDecision {
        let (decision, source) = self.decide(call, messages, cancel).await;
        if decision.should_block {
            info!("Blocked {} call {} ({})", call.name, call.id, source.as_str());
            self.logger.log(DecisionEvent::new(
                events::PLAN_EXIT_BLOCKED,
                serde_json::json!({
                    "tool_call_id": call.id,
                    "source": source.as_str(),
                    "reason": decision.reason,
                }),
            ));
        }
        decision
    }

    async fn decide(
        &self,
        call: &ToolCall,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> (GuardDecision, DecisionSource) {
        let assessment = match self.guard.assess(call, messages) {
            PlanExitAssessment::Settled(decision) => return (decision, DecisionSource::EdgeCase),
            PlanExitAssessment::Open(assessment) => assessment,
        };
        debug!(
            "Plan-exit heuristics: content={}, activity={:?} ({} impl / {} research)",
            assessment.content,
            assessment.activity.signal,
            assessment.activity.implementation,
            assessment.activity.research
        );

        let Some(adjudicator) = &self.adjudicator else {
            return (assessment.verdict, DecisionSource::Heuristic);
        };

        let request = AdjudicationRequest {
            plan: assessment.plan.clone(),
            recent_messages: trailing(messages, self.guard.policy().activity_window).to_vec(),
            content: assessment.content,
            activity: assessment.activity,
            heuristic: assessment.verdict.clone(),
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AdjudicatorError::Cancelled),
            result = tokio::time::timeout(self.timeout, adjudicator.adjudicate(&request)) => {
                result.unwrap_or(Err(AdjudicatorError::Timeout))
            }
        };

        match outcome {
            Ok(verdict) => {
                debug!("Adjudicator {} verdict: block={}", adjudicator.name(), verdict.block);
                (verdict.into_decision(), DecisionSource::Adjudicator)
            }
            Err(e) => {
                warn!(
                    "Adjudicator {} unavailable ({}), using heuristic verdict",
                    adjudicator.name(),
                    e
                );
                self.logger.log(DecisionEvent::new(
                    events::ADJUDICATOR_FALLBACK,
                    serde_json::json!({
                        "tool_call_id": call.id,
                        "adjudicator": adjudicator.name(),
                        "error": e.to_string(),
                        "heuristic_block": assessment.verdict.should_block,
                    }),
                ));
                (assessment.verdict, DecisionSource::Heuristic)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::decision_logger::testing::RecordingLogger;
    use crate::ports::plan_exit_adjudicator::AdjudicatorVerdict;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use toolguard_domain::{EXIT_PLAN_MODE, PLAN_EXIT_GUARD_MARKER};

    // ==================== Mock adjudicators ====================

    struct FixedAdjudicator {
        block: bool,
        calls: AtomicUsize,
    }

    impl FixedAdjudicator {
        fn new(block: bool) -> Arc<Self> {
            Arc::new(Self {
                block,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PlanExitAdjudicator for FixedAdjudicator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn adjudicate(
            &self,
            _request: &AdjudicationRequest,
        ) -> Result<AdjudicatorVerdict, AdjudicatorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AdjudicatorVerdict {
                block: self.block,
                reason: "judged".into(),
            })
        }
    }

    struct FailingAdjudicator;

    #[async_trait]
    impl PlanExitAdjudicator for FailingAdjudicator {
        fn name(&self) -> &str {
            "failing"
        }

        async fn adjudicate(
            &self,
            _request: &AdjudicationRequest,
        ) -> Result<AdjudicatorVerdict, AdjudicatorError> {
            Err(AdjudicatorError::RequestFailed("connection refused".into()))
        }
    }

    struct SlowAdjudicator;

    #[async_trait]
    impl PlanExitAdjudicator for SlowAdjudicator {
        fn name(&self) -> &str {
            "slow"
        }

        async fn adjudicate(
            &self,
            _request: &AdjudicationRequest,
        ) -> Result<AdjudicatorVerdict, AdjudicatorError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(AdjudicatorVerdict {
                block: false,
                reason: String::new(),
            })
        }
    }

    // ==================== Helpers ====================

    fn exit_call(plan: &str) -> ToolCall {
        ToolCall::new(EXIT_PLAN_MODE)
            .with_id("call_1")
            .with_arg("plan", plan)
    }

    fn busy_conversation() -> Vec<Message> {
        let mut messages = vec![Message::user("add caching")];
        for name in ["Write", "Edit", "Bash", "Edit", "Write"] {
            messages.push(Message::assistant_tool_calls(vec![ToolCall::new(name)]));
        }
        messages
    }

    const COMPLETION_PLAN: &str = "\u{2705} Added caching\n\u{2705} All tests passing";
    const PLANNING_PLAN: &str = "1. Add a cache layer\n2. Wire it into the store";

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_heuristics_without_adjudicator() {
        let use_case = ValidateExitPlanModeUseCase::new(GuardPolicy::default());
        let cancel = CancellationToken::new();

        let blocked = use_case
            .execute(&exit_call(COMPLETION_PLAN), &busy_conversation(), &cancel)
            .await;
        assert!(blocked.should_block);
        assert!(blocked.reason.starts_with(PLAN_EXIT_GUARD_MARKER));

        let allowed = use_case
            .execute(&exit_call(PLANNING_PLAN), &busy_conversation(), &cancel)
            .await;
        assert!(!allowed.should_block);
    }

    #[tokio::test]
    async fn test_adjudicator_overrides_heuristics() {
        let allowing = FixedAdjudicator::new(false);
        let use_case =
            ValidateExitPlanModeUseCase::new(GuardPolicy::default()).with_adjudicator(allowing.clone());
        let decision = use_case
            .execute(&exit_call(COMPLETION_PLAN), &busy_conversation(), &CancellationToken::new())
            .await;
        assert!(!decision.should_block);
        assert_eq!(allowing.calls.load(Ordering::SeqCst), 1);

        let blocking = FixedAdjudicator::new(true);
        let use_case =
            ValidateExitPlanModeUseCase::new(GuardPolicy::default()).with_adjudicator(blocking);
        let decision = use_case
            .execute(&exit_call(PLANNING_PLAN), &busy_conversation(), &CancellationToken::new())
            .await;
        assert!(decision.should_block);
        assert!(decision.reason.starts_with(PLAN_EXIT_GUARD_MARKER));
    }

    #[tokio::test]
    async fn test_edge_cases_skip_adjudicator() {
        let adjudicator = FixedAdjudicator::new(false);
        let use_case = ValidateExitPlanModeUseCase::new(GuardPolicy::default())
            .with_adjudicator(adjudicator.clone());
        let cancel = CancellationToken::new();

        let empty = use_case.execute(&exit_call(""), &busy_conversation(), &cancel).await;
        assert!(empty.should_block);

        let no_history = use_case.execute(&exit_call(COMPLETION_PLAN), &[], &cancel).await;
        assert!(!no_history.should_block);

        let missing = use_case
            .execute(&ToolCall::new(EXIT_PLAN_MODE), &busy_conversation(), &cancel)
            .await;
        assert!(!missing.should_block);

        assert_eq!(adjudicator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_falls_back_and_logs() {
        let logger = Arc::new(RecordingLogger::default());
        let use_case = ValidateExitPlanModeUseCase::new(GuardPolicy::default())
            .with_adjudicator(Arc::new(FailingAdjudicator))
            .with_logger(logger.clone());

        let decision = use_case
            .execute(&exit_call(COMPLETION_PLAN), &busy_conversation(), &CancellationToken::new())
            .await;
        assert!(decision.should_block);
        assert_eq!(
            logger.types(),
            vec![events::ADJUDICATOR_FALLBACK, events::PLAN_EXIT_BLOCKED]
        );
        let fallback = logger.find(events::ADJUDICATOR_FALLBACK).unwrap();
        assert_eq!(fallback.payload["adjudicator"], "failing");
        let blocked = logger.find(events::PLAN_EXIT_BLOCKED).unwrap();
        assert_eq!(blocked.payload["source"], "heuristic");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let use_case = ValidateExitPlanModeUseCase::new(GuardPolicy::default())
            .with_adjudicator(Arc::new(SlowAdjudicator))
            .with_timeout(Duration::from_millis(100));

        let decision = use_case
            .execute(&exit_call(COMPLETION_PLAN), &busy_conversation(), &CancellationToken::new())
            .await;
        // The slow adjudicator would have allowed; the heuristic blocks
        assert!(decision.should_block);
    }

    #[tokio::test]
    async fn test_cancellation_falls_back() {
        let adjudicator = FixedAdjudicator::new(false);
        let use_case = ValidateExitPlanModeUseCase::new(GuardPolicy::default())
            .with_adjudicator(adjudicator.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let decision = use_case
            .execute(&exit_call(COMPLETION_PLAN), &busy_conversation(), &cancel)
            .await;
        assert!(decision.should_block);
    }
}
