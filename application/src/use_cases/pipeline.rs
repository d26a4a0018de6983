//! Tool-call pipeline use case
//!
//! Wires the domain components into the two hooks of a request cycle:
//!
//! | Hook | Steps |
//! |------|-------|
//! | [`pre_forward`](ToolCallPipeline::pre_forward) | loop detection (short-circuit) → rule engine → tool filtering + forced tool choice |
//! | [`post_response`](ToolCallPipeline::post_response) | name normalization → structural correction → validation → plan-exit guard |
//!
//! Nothing here aborts a request: problems become issues, fallbacks or log
//! records.

use crate::config::PipelineConfig;
use crate::ports::decision_logger::{DecisionEvent, DecisionLogger, NoDecisionLogger, events};
use crate::ports::plan_exit_adjudicator::PlanExitAdjudicator;
use crate::use_cases::plan_exit_guard::ValidateExitPlanModeUseCase;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use toolguard_domain::{
    GuardDecision, LoopDetection, LoopDetector, Message, Rule, RuleDecision, RuleEngine,
    SchemaRegistry, StructuralCorrector, ToolCall, ToolDefinition, ToolValidator,
    ValidationResult, filter_tools, should_force_tool_choice,
};
use tracing::{debug, info, warn};

pub const STOP_REASON_TOOL_USE: &str = "tool_use";
pub const STOP_REASON_END_TURN: &str = "end_turn";

/// Outbound tool policy for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolPolicy {
    pub tools: Vec<ToolDefinition>,
    pub force_tool_choice: bool,
    pub decision: RuleDecision,
}

/// Result of the pre-forward hook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PreForward {
    /// Send the request to the backend with this tool policy.
    Forward(ToolPolicy),
    /// Do not call the backend; answer with this message.
    ShortCircuit {
        message: Message,
        detection: LoopDetection,
    },
}

/// A tool call that failed validation after correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallIssue {
    /// Position in the corrected call list
    pub index: usize,
    pub tool_name: String,
    pub tool_call_id: String,
    pub validation: ValidationResult,
}

/// Output of [`ToolCallPipeline::correct_tool_calls`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionReport {
    pub calls: Vec<ToolCall>,
    /// Per call: whether anything was rewritten
    pub fixed: Vec<bool>,
    pub issues: Vec<CallIssue>,
}

impl CorrectionReport {
    pub fn any_fixed(&self) -> bool {
        self.fixed.iter().any(|f| *f)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A plan-exit call removed by the guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedCall {
    pub call: ToolCall,
    pub reason: String,
}

/// Normalized backend response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResponse {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked: Vec<BlockedCall>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl BackendResponse {
    pub fn new(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        let stop_reason = if tool_calls.is_empty() {
            STOP_REASON_END_TURN
        } else {
            STOP_REASON_TOOL_USE
        };
        Self {
            content: content.into(),
            tool_calls,
            stop_reason: Some(stop_reason.to_string()),
            blocked: Vec::new(),
            issues: Vec::new(),
        }
    }
}

pub struct ToolCallPipeline {
    registry: Arc<SchemaRegistry>,
    rules: RuleEngine,
    validator: ToolValidator,
    corrector: StructuralCorrector,
    loop_detector: LoopDetector,
    plan_exit: ValidateExitPlanModeUseCase,
    logger: Arc<dyn DecisionLogger>,
    config: PipelineConfig,
}

impl ToolCallPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.rule_names()
    }

    pub fn has_adjudicator(&self) -> bool {
        self.plan_exit.has_adjudicator()
    }

    // ==================== Pre-forward ====================

    /// Decide the outbound tool list and whether to force a tool call.
    pub fn filter_and_choose_tool_policy(
        &self,
        conversation: &[Message],
        tools: &[ToolDefinition],
    ) -> ToolPolicy {
        let decision = self.rules.detect_tool_necessity(conversation, tools, None);
        let filtered = filter_tools(&decision, tools);
        let force_tool_choice = should_force_tool_choice(&decision, &filtered);

        if filtered.len() != tools.len() {
            let removed: Vec<&str> = tools
                .iter()
                .filter(|t| !filtered.iter().any(|f| f.name == t.name))
                .map(|t| t.name.as_str())
                .collect();
            debug!("Filtered tools {:?} (intent: {})", removed, decision.intent);
            self.logger.log(DecisionEvent::new(
                events::TOOLS_FILTERED,
                serde_json::json!({
                    "removed": removed,
                    "intent": decision.intent,
                    "reason": decision.reason,
                }),
            ));
        }

        if self.config.debug {
            debug!(
                "Tool decision: require={} confident={} intent={} reason={}",
                decision.require_tools, decision.confident, decision.intent, decision.reason
            );
        }
        self.logger.log(DecisionEvent::new(
            events::TOOL_CHOICE,
            serde_json::json!({
                "force_tool_choice": force_tool_choice,
                "require_tools": decision.require_tools,
                "confident": decision.confident,
                "intent": decision.intent,
                "reason": decision.reason,
                "tool_count": filtered.len(),
            }),
        ));

        ToolPolicy {
            tools: filtered,
            force_tool_choice,
            decision,
        }
    }

    pub fn detect_loop(&self, conversation: &[Message]) -> LoopDetection {
        let detection = self.loop_detector.detect_loop(conversation);
        if detection.has_loop {
            warn!(
                "Tool-call loop detected: {:?} on {} ({} repetitions)",
                detection.loop_type, detection.tool_name, detection.evidence.repetitions
            );
            self.logger.log(DecisionEvent::new(
                events::LOOP_DETECTED,
                serde_json::json!({
                    "loop_type": detection.loop_type,
                    "tool_name": detection.tool_name,
                    "evidence": detection.evidence,
                }),
            ));
        }
        detection
    }

    /// Loop check first; only a loop-free conversation reaches the rules.
    pub fn pre_forward(&self, conversation: &[Message], tools: &[ToolDefinition]) -> PreForward {
        let detection = self.detect_loop(conversation);
        if let Some(message) = detection.terminal_message() {
            return PreForward::ShortCircuit { message, detection };
        }
        PreForward::Forward(self.filter_and_choose_tool_policy(conversation, tools))
    }

    // ==================== Post-response ====================

    /// Normalize names, repair structure, then validate every call.
    ///
    /// Schemas come from the request's tool list where it declares them,
    /// otherwise from the shared registry.
    pub fn correct_tool_calls(
        &self,
        calls: Vec<ToolCall>,
        tools: &[ToolDefinition],
    ) -> CorrectionReport {
        let view = self.registry.overlay(tools);
        let mut corrected = Vec::with_capacity(calls.len());
        let mut fixed = Vec::with_capacity(calls.len());
        let mut issues = Vec::new();

        for (index, mut call) in calls.into_iter().enumerate() {
            let mut was_fixed = false;

            if let Some((canonical, true)) = self.validator.resolve_name(&call.name, &view) {
                debug!("Renamed tool call {} -> {}", call.name, canonical);
                self.logger.log(DecisionEvent::new(
                    events::TOOL_CALL_CORRECTED,
                    serde_json::json!({
                        "tool_call_id": call.id,
                        "kind": "name",
                        "from": call.name,
                        "to": canonical,
                    }),
                ));
                call.name = canonical;
                was_fixed = true;
            }

            let schema = view.get_schema(&call.name);
            let (call, structurally_fixed) = self.corrector.correct(call, schema.as_deref());
            if structurally_fixed {
                debug!("Repaired arguments of {} call {}", call.name, call.id);
                self.logger.log(DecisionEvent::new(
                    events::TOOL_CALL_CORRECTED,
                    serde_json::json!({
                        "tool_call_id": call.id,
                        "kind": "arguments",
                        "tool_name": call.name,
                    }),
                ));
            }
            was_fixed |= structurally_fixed;

            let validation = self.validator.validate_call(&call, &view);
            if !validation.is_valid {
                info!("Tool call {} ({}) still invalid: {}", call.id, call.name, validation.describe());
                self.logger.log(DecisionEvent::new(
                    events::TOOL_CALL_ISSUE,
                    serde_json::json!({
                        "tool_call_id": call.id,
                        "tool_name": call.name,
                        "issue": validation.describe(),
                    }),
                ));
                issues.push(CallIssue {
                    index,
                    tool_name: call.name.clone(),
                    tool_call_id: call.id.clone(),
                    validation,
                });
            }

            corrected.push(call);
            fixed.push(was_fixed);
        }

        CorrectionReport {
            calls: corrected,
            fixed,
            issues,
        }
    }

    pub async fn validate_exit_plan_mode(
        &self,
        call: &ToolCall,
        conversation: &[Message],
        cancel: &CancellationToken,
    ) -> GuardDecision {
        self.plan_exit.execute(call, conversation, cancel).await
    }

    /// Repair the response's tool calls and drop blocked plan-exit calls.
    ///
    /// A blocked call's reason is appended to the response text so the
    /// client model sees why its call vanished. Plan-exit calls are judged
    /// concurrently.
    pub async fn post_response(
        &self,
        response: BackendResponse,
        conversation: &[Message],
        tools: &[ToolDefinition],
        cancel: &CancellationToken,
    ) -> BackendResponse {
        let BackendResponse {
            mut content,
            tool_calls,
            mut stop_reason,
            mut blocked,
            mut issues,
        } = response;

        let report = self.correct_tool_calls(tool_calls, tools);
        issues.extend(
            report
                .issues
                .iter()
                .map(|i| format!("{} ({}): {}", i.tool_name, i.tool_call_id, i.validation.describe())),
        );

        let decisions = join_all(report.calls.iter().map(|call| async move {
            if call.is_plan_exit() {
                Some(self.validate_exit_plan_mode(call, conversation, cancel).await)
            } else {
                None
            }
        }))
        .await;

        let mut kept = Vec::with_capacity(report.calls.len());
        for (call, decision) in report.calls.into_iter().zip(decisions) {
            match decision {
                Some(decision) if decision.should_block => {
                    if !content.is_empty() {
                        content.push_str("\n\n");
                    }
                    content.push_str(&decision.reason);
                    blocked.push(BlockedCall {
                        call,
                        reason: decision.reason,
                    });
                }
                _ => kept.push(call),
            }
        }

        if kept.is_empty() && stop_reason.as_deref() == Some(STOP_REASON_TOOL_USE) {
            stop_reason = Some(STOP_REASON_END_TURN.to_string());
        }

        BackendResponse {
            content,
            tool_calls: kept,
            stop_reason,
            blocked,
            issues,
        }
    }
}

/// Builder for [`ToolCallPipeline`].
pub struct PipelineBuilder {
    registry: Option<Arc<SchemaRegistry>>,
    rules: RuleEngine,
    config: PipelineConfig,
    adjudicator: Option<Arc<dyn PlanExitAdjudicator>>,
    logger: Arc<dyn DecisionLogger>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            rules: RuleEngine::with_builtin_rules(),
            config: PipelineConfig::default(),
            adjudicator: None,
            logger: Arc::new(NoDecisionLogger),
        }
    }

    /// Share an existing registry (otherwise one with fallbacks is created).
    pub fn with_registry(mut self, registry: Arc<SchemaRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.add_custom_rule(rule);
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_adjudicator(mut self, adjudicator: Arc<dyn PlanExitAdjudicator>) -> Self {
        self.adjudicator = Some(adjudicator);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn DecisionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn build(self) -> ToolCallPipeline {
        let mut plan_exit = ValidateExitPlanModeUseCase::new(self.config.guard)
            .with_timeout(self.config.adjudicator_timeout)
            .with_logger(self.logger.clone());
        if let Some(adjudicator) = self.adjudicator {
            plan_exit = plan_exit.with_adjudicator(adjudicator);
        }

        ToolCallPipeline {
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(SchemaRegistry::with_fallbacks())),
            rules: self.rules,
            validator: ToolValidator,
            corrector: StructuralCorrector,
            loop_detector: LoopDetector::new(self.config.loops),
            plan_exit,
            logger: self.logger,
            config: self.config,
        }
    }
}
