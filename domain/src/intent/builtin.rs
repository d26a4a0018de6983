//! Built-in tool-necessity rules.
//!
//! | Rule | Priority | Decision |
//! |------|---------:|----------|
//! | [`DocumentationRule`] | 110 | require (documentation verb or doc artifact) |
//! | [`ImplementationWithFileTargetRule`] | 100 | require (implementation verb + file/code target) |
//! | [`MixedImplementationDominantRule`] | 90 | require when implementation dominates a mixed request |
//! | [`PureResearchRule`] | 80 | optional (only research verbs) |
//! | [`ImplementationVerbRule`] | 60 | require (strong implementation verb, no target) |

use super::action::{ActionPair, VerbKind};
use super::rule::{Intent, PairCounts, Rule, RuleDecision};
use crate::conversation::Message;

/// Verbs that write documentation when aimed at a doc artifact.
const DOC_WRITING_VERBS: &[&str] = &[
    "write", "update", "add", "create", "draft", "generate", "edit", "rewrite", "fix",
];

pub const PRIORITY_DOCUMENTATION: i32 = 110;
pub const PRIORITY_IMPLEMENTATION_WITH_FILE: i32 = 100;
pub const PRIORITY_MIXED: i32 = 90;
pub const PRIORITY_PURE_RESEARCH: i32 = 80;
pub const PRIORITY_IMPLEMENTATION_VERB: i32 = 60;

/// All built-in rules, in registration order.
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(DocumentationRule),
        Box::new(ImplementationWithFileTargetRule),
        Box::new(MixedImplementationDominantRule),
        Box::new(PureResearchRule),
        Box::new(ImplementationVerbRule),
    ]
}

/// Documentation verb, or a writing verb aimed at documentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentationRule;

impl Rule for DocumentationRule {
    fn priority(&self) -> i32 {
        PRIORITY_DOCUMENTATION
    }

    fn name(&self) -> &str {
        "documentation_artifact"
    }

    fn evaluate(&self, pairs: &[ActionPair], _messages: &[Message]) -> Option<RuleDecision> {
        let pair = pairs.iter().find(|p| {
            p.kind == VerbKind::Documentation
                || (p.is_implementation()
                    && DOC_WRITING_VERBS.contains(&p.verb.as_str())
                    && p.has_doc_artifact())
        })?;
        Some(RuleDecision::require(
            Intent::Documentation,
            format!("documentation verb '{}' targeting '{}'", pair.verb, pair.artifact),
        ))
    }
}

/// Implementation verb aimed at a file or piece of code, no research verbs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImplementationWithFileTargetRule;

impl Rule for ImplementationWithFileTargetRule {
    fn priority(&self) -> i32 {
        PRIORITY_IMPLEMENTATION_WITH_FILE
    }

    fn name(&self) -> &str {
        "implementation_with_file_target"
    }

    fn evaluate(&self, pairs: &[ActionPair], _messages: &[Message]) -> Option<RuleDecision> {
        if PairCounts::of(pairs).research > 0 {
            return None;
        }
        let pair = pairs
            .iter()
            .find(|p| p.is_implementation() && p.has_file_target())?;
        Some(RuleDecision::require(
            Intent::Implementation,
            format!("implementation verb '{}' with file target '{}'", pair.verb, pair.artifact),
        ))
    }
}

/// Research and implementation verbs together.
///
/// Implementation dominates when it has at least as many pairs as research,
/// or when the request ends on an implementation step ("read X, then fix
/// Y"). A research-dominated mix produces a tentative, tools-optional
/// decision so lower-priority rules still get a say.
#[derive(Debug, Clone, Copy, Default)]
pub struct MixedImplementationDominantRule;

impl Rule for MixedImplementationDominantRule {
    fn priority(&self) -> i32 {
        PRIORITY_MIXED
    }

    fn name(&self) -> &str {
        "mixed_implementation_dominant"
    }

    fn evaluate(&self, pairs: &[ActionPair], _messages: &[Message]) -> Option<RuleDecision> {
        let counts = PairCounts::of(pairs);
        if counts.research == 0 || counts.implementation == 0 {
            return None;
        }
        let ends_on_implementation = pairs.last().is_some_and(ActionPair::is_implementation);
        if counts.implementation >= counts.research || ends_on_implementation {
            Some(RuleDecision::require(
                Intent::Mixed,
                format!(
                    "mixed request with dominant implementation ({} implementation, {} research)",
                    counts.implementation, counts.research
                ),
            ))
        } else {
            Some(
                RuleDecision::optional(
                    Intent::Research,
                    format!(
                        "mixed request dominated by research ({} implementation, {} research)",
                        counts.implementation, counts.research
                    ),
                )
                .tentative(),
            )
        }
    }
}

/// Only research verbs: leave tools optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct PureResearchRule;

impl Rule for PureResearchRule {
    fn priority(&self) -> i32 {
        PRIORITY_PURE_RESEARCH
    }

    fn name(&self) -> &str {
        "pure_research"
    }

    fn evaluate(&self, pairs: &[ActionPair], _messages: &[Message]) -> Option<RuleDecision> {
        let counts = PairCounts::of(pairs);
        if counts.research == 0 || counts.implementation > 0 || counts.documentation > 0 {
            return None;
        }
        Some(RuleDecision::optional(
            Intent::Research,
            "only research/analysis verbs detected, no implementation",
        ))
    }
}

/// Strong implementation verb without a recognizable target.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImplementationVerbRule;

impl Rule for ImplementationVerbRule {
    fn priority(&self) -> i32 {
        PRIORITY_IMPLEMENTATION_VERB
    }

    fn name(&self) -> &str {
        "implementation_verb"
    }

    fn evaluate(&self, pairs: &[ActionPair], _messages: &[Message]) -> Option<RuleDecision> {
        if PairCounts::of(pairs).research > 0 {
            return None;
        }
        let pair = pairs.iter().find(|p| p.is_strong_implementation())?;
        Some(RuleDecision::require(
            Intent::Implementation,
            format!("strong implementation verb '{}'", pair.verb),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::action::extract_action_pairs;

    fn eval(rule: &dyn Rule, text: &str) -> Option<RuleDecision> {
        rule.evaluate(&extract_action_pairs(text), &[])
    }

    #[test]
    fn test_documentation_rule() {
        let d = eval(&DocumentationRule, "update the README with install steps").unwrap();
        assert!(d.require_tools);
        assert_eq!(d.intent, Intent::Documentation);

        assert!(eval(&DocumentationRule, "document the retry module").is_some());
        // Reading docs is not writing docs
        assert!(eval(&DocumentationRule, "read architecture.md").is_none());
    }

    #[test]
    fn test_implementation_with_file_target() {
        let d = eval(&ImplementationWithFileTargetRule, "fix the panic in src/parser.rs").unwrap();
        assert!(d.require_tools && d.confident);
        assert_eq!(d.intent, Intent::Implementation);

        assert!(eval(&ImplementationWithFileTargetRule, "implement something nice").is_none());
        assert!(eval(&ImplementationWithFileTargetRule, "read main.rs and fix it").is_none());
    }

    #[test]
    fn test_mixed_rule_dominance() {
        let d = eval(&MixedImplementationDominantRule, "read main.rs and fix the bug").unwrap();
        assert!(d.require_tools && d.confident);
        assert_eq!(d.intent, Intent::Mixed);

        let d = eval(
            &MixedImplementationDominantRule,
            "fix the bug, then explain the design and review the tests",
        )
        .unwrap();
        assert!(!d.require_tools);
        assert!(!d.confident);

        assert!(eval(&MixedImplementationDominantRule, "read main.rs").is_none());
    }

    #[test]
    fn test_pure_research() {
        let d = eval(&PureResearchRule, "read architecture.md and check recent changes").unwrap();
        assert!(!d.require_tools);
        assert!(d.confident);
        assert_eq!(d.intent, Intent::Research);
        assert!(d.reason.contains("only research/analysis verbs"));

        assert!(eval(&PureResearchRule, "read main.rs and fix it").is_none());
        assert!(eval(&PureResearchRule, "hello there").is_none());
    }

    #[test]
    fn test_implementation_verb() {
        let d = eval(&ImplementationVerbRule, "implement rate limiting").unwrap();
        assert!(d.require_tools);
        assert!(eval(&ImplementationVerbRule, "change the tone").is_none());
    }

    #[test]
    fn test_builtin_rules_are_distinct() {
        let rules = builtin_rules();
        let mut names: Vec<_> = rules.iter().map(|r| r.name().to_string()).collect();
        names.dedup();
        assert_eq!(names.len(), 5);
    }
}
