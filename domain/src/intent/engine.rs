//! Rule engine: the tool-necessity classifier.
//!
//! Rules are kept sorted by descending priority at registration time, so a
//! request only walks the list once. Equal priorities keep registration
//! order: a custom rule registered with the same priority as a built-in runs
//! after it.

use super::action::{ActionPair, extract_action_pairs};
use super::builtin::builtin_rules;
use super::rule::{Intent, PairCounts, Rule, RuleDecision};
use crate::conversation::{Message, latest_user_text};
use crate::tool::entities::ToolDefinition;

/// Reason given when research verbs were seen but no rule was confident.
pub const RESEARCH_DEFAULT_REASON: &str =
    "only research/analysis verbs detected, no implementation";

/// Reason given when nothing recognizable was found.
pub const CONVERSATIONAL_DEFAULT_REASON: &str =
    "no confident rule matched; defaulting to natural conversation";

/// Priority-ordered rule collection.
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleEngine {
    /// Engine without any rules; every request gets the conservative default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine holding the built-in rules.
    pub fn with_builtin_rules() -> Self {
        let mut engine = Self::new();
        for rule in builtin_rules() {
            engine.insert(rule);
        }
        engine
    }

    /// Register an additional rule. It takes part in the same priority
    /// ordering as the built-ins.
    pub fn add_custom_rule(&mut self, rule: impl Rule + 'static) {
        self.insert(Box::new(rule));
    }

    fn insert(&mut self, rule: Box<dyn Rule>) {
        let priority = rule.priority();
        let index = self
            .rules
            .iter()
            .position(|existing| existing.priority() < priority)
            .unwrap_or(self.rules.len());
        self.rules.insert(index, rule);
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Decide whether the backend should be forced to call a tool.
    ///
    /// Pairs are extracted from the latest user message, with
    /// `extra_context` (a system hint, say) appended when given.
    pub fn detect_tool_necessity(
        &self,
        messages: &[Message],
        available_tools: &[ToolDefinition],
        extra_context: Option<&str>,
    ) -> RuleDecision {
        let mut text = latest_user_text(messages).unwrap_or_default().to_string();
        if let Some(extra) = extra_context.filter(|e| !e.trim().is_empty()) {
            text.push('\n');
            text.push_str(extra);
        }
        let pairs = extract_action_pairs(&text);

        if available_tools.is_empty() {
            return RuleDecision::optional(
                PairCounts::of(&pairs).dominant_intent(),
                "no tools available",
            );
        }

        self.evaluate(&pairs, messages)
    }

    /// Evaluate rules against already-extracted pairs.
    pub fn evaluate(&self, pairs: &[ActionPair], messages: &[Message]) -> RuleDecision {
        for rule in &self.rules {
            if let Some(decision) = rule.evaluate(pairs, messages)
                && decision.confident
            {
                return decision;
            }
        }
        Self::conservative_default(pairs)
    }

    fn conservative_default(pairs: &[ActionPair]) -> RuleDecision {
        let intent = PairCounts::of(pairs).dominant_intent();
        let reason = match intent {
            Intent::Research => RESEARCH_DEFAULT_REASON,
            _ => CONVERSATIONAL_DEFAULT_REASON,
        };
        RuleDecision::optional(intent, reason).tentative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition::new("Read", "read"),
            ToolDefinition::new("Write", "write"),
        ]
    }

    fn detect(engine: &RuleEngine, text: &str) -> RuleDecision {
        engine.detect_tool_necessity(&[Message::user(text)], &tools(), None)
    }

    struct FixedRule {
        name: &'static str,
        priority: i32,
        decision: Option<RuleDecision>,
    }

    impl Rule for FixedRule {
        fn priority(&self) -> i32 {
            self.priority
        }
        fn name(&self) -> &str {
            self.name
        }
        fn evaluate(&self, _: &[ActionPair], _: &[Message]) -> Option<RuleDecision> {
            self.decision.clone()
        }
    }

    #[test]
    fn test_builtin_order() {
        let engine = RuleEngine::with_builtin_rules();
        assert_eq!(
            engine.rule_names(),
            vec![
                "documentation_artifact",
                "implementation_with_file_target",
                "mixed_implementation_dominant",
                "pure_research",
                "implementation_verb",
            ]
        );
    }

    #[test]
    fn test_implementation_requires_tools() {
        let engine = RuleEngine::with_builtin_rules();
        let d = detect(&engine, "Please fix the off-by-one error in src/lib.rs");
        assert!(d.require_tools);
        assert!(d.confident);
    }

    #[test]
    fn test_research_does_not_require_tools() {
        let engine = RuleEngine::with_builtin_rules();
        let d = detect(&engine, "read architecture.md and check recent changes");
        assert!(!d.require_tools);
        assert_eq!(d.intent, Intent::Research);
    }

    #[test]
    fn test_ambiguous_defaults_to_conversation() {
        let engine = RuleEngine::with_builtin_rules();
        let d = detect(&engine, "thanks, great work");
        assert!(!d.require_tools);
        assert!(!d.confident);
        assert_eq!(d.reason, CONVERSATIONAL_DEFAULT_REASON);
        assert_eq!(d.intent, Intent::Conversational);
    }

    #[test]
    fn test_research_dominated_mix_defaults_to_research() {
        let engine = RuleEngine::with_builtin_rules();
        let d = detect(
            &engine,
            "fix the bug, then explain the design and review the tests",
        );
        assert!(!d.require_tools);
        assert_eq!(d.reason, RESEARCH_DEFAULT_REASON);
        assert_eq!(d.intent, Intent::Research);
    }

    #[test]
    fn test_no_tools_available() {
        let engine = RuleEngine::with_builtin_rules();
        let d = engine.detect_tool_necessity(&[Message::user("fix main.rs")], &[], None);
        assert!(!d.require_tools);
        assert_eq!(d.reason, "no tools available");
    }

    #[test]
    fn test_extra_context_contributes_pairs() {
        let engine = RuleEngine::with_builtin_rules();
        let d = engine.detect_tool_necessity(
            &[Message::user("ok")],
            &tools(),
            Some("implement the handler in api.rs"),
        );
        assert!(d.require_tools);
    }

    #[test]
    fn test_custom_rule_participates_in_priority() {
        let mut engine = RuleEngine::with_builtin_rules();
        engine.add_custom_rule(FixedRule {
            name: "always_optional",
            priority: 200,
            decision: Some(RuleDecision::optional(Intent::Conversational, "custom")),
        });
        assert_eq!(engine.rule_names()[0], "always_optional");

        let d = detect(&engine, "fix src/lib.rs");
        assert!(!d.require_tools);
        assert_eq!(d.reason, "custom");
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let mut engine = RuleEngine::new();
        engine.add_custom_rule(FixedRule {
            name: "first",
            priority: 10,
            decision: Some(RuleDecision::require(Intent::Implementation, "first")),
        });
        engine.add_custom_rule(FixedRule {
            name: "second",
            priority: 10,
            decision: Some(RuleDecision::optional(Intent::Research, "second")),
        });
        engine.add_custom_rule(FixedRule {
            name: "low",
            priority: 1,
            decision: None,
        });
        assert_eq!(engine.rule_names(), vec!["first", "second", "low"]);
        assert_eq!(detect(&engine, "anything").reason, "first");
    }

    #[test]
    fn test_tentative_match_does_not_stop_evaluation() {
        let mut engine = RuleEngine::new();
        engine.add_custom_rule(FixedRule {
            name: "unsure",
            priority: 50,
            decision: Some(RuleDecision::require(Intent::Implementation, "unsure").tentative()),
        });
        engine.add_custom_rule(FixedRule {
            name: "sure",
            priority: 40,
            decision: Some(RuleDecision::optional(Intent::Research, "sure")),
        });
        assert_eq!(detect(&engine, "anything").reason, "sure");
    }

    #[test]
    fn test_uses_latest_user_message() {
        let engine = RuleEngine::with_builtin_rules();
        let messages = vec![
            Message::user("fix src/lib.rs"),
            Message::assistant("done"),
            Message::user("now explain what you changed"),
        ];
        let d = engine.detect_tool_necessity(&messages, &tools(), None);
        assert!(!d.require_tools);
        assert_eq!(d.intent, Intent::Research);
    }
}
