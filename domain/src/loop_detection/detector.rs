//! Repeating tool-call pattern detection.
//!
//! Only assistant turns after the latest user text count: a fresh
//! instruction from the user resets the history the detector looks at.

use super::signature::{canonical_tool_name, turn_signature};
use super::value_objects::{LoopDetection, LoopEvidence, LoopType};
use crate::conversation::{Message, trailing};
use crate::core::string::truncate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const MAX_SIGNATURE_LEN: usize = 160;

/// Window sizes and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopPolicy {
    pub window_messages: usize,
    pub consecutive_threshold: usize,
    pub max_cycle_period: usize,
    pub min_cycle_repeats: usize,
}

impl Default for LoopPolicy {
    fn default() -> Self {
        Self {
            window_messages: 40,
            consecutive_threshold: 3,
            max_cycle_period: 3,
            min_cycle_repeats: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoopDetector {
    policy: LoopPolicy,
}

struct Turn {
    signature: String,
    tool_names: Vec<String>,
}

impl LoopDetector {
    pub fn new(policy: LoopPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &LoopPolicy {
        &self.policy
    }

    /// Inspect the trailing window of `messages` for a loop.
    pub fn detect_loop(&self, messages: &[Message]) -> LoopDetection {
        let turns = Self::turns(trailing(messages, self.policy.window_messages));

        if let Some(detection) = self.consecutive_identical(&turns) {
            return detection;
        }
        if let Some(detection) = self.alternating(&turns) {
            return detection;
        }
        LoopDetection::none(turns.len())
    }

    fn turns(window: &[Message]) -> Vec<Turn> {
        let start = window
            .iter()
            .rposition(|m| m.is_user() && !m.content.trim().is_empty())
            .map_or(0, |i| i + 1);
        window[start..]
            .iter()
            .filter(|m| m.is_assistant() && m.has_tool_calls())
            .map(|m| Turn {
                signature: turn_signature(&m.tool_calls),
                tool_names: m.tool_calls.iter().map(|c| canonical_tool_name(&c.name)).collect(),
            })
            .collect()
    }

    fn consecutive_identical(&self, turns: &[Turn]) -> Option<LoopDetection> {
        let threshold = self.policy.consecutive_threshold.max(2);
        let last = turns.last()?;
        let run = turns
            .iter()
            .rev()
            .take_while(|t| t.signature == last.signature)
            .count();
        if run < threshold {
            return None;
        }
        Some(LoopDetection::detected(
            LoopType::ConsecutiveIdentical,
            join_names([last]),
            LoopEvidence {
                repetitions: run,
                turns_examined: turns.len(),
                signatures: vec![truncate(&last.signature, MAX_SIGNATURE_LEN)],
            },
        ))
    }

    fn alternating(&self, turns: &[Turn]) -> Option<LoopDetection> {
        let min_repeats = self.policy.min_cycle_repeats.max(2);
        let longest_period = self.policy.max_cycle_period.min(turns.len() / 2);
        (2..=longest_period).find_map(|period| {
            if turns.len() < period.saturating_mul(min_repeats) {
                return None;
            }
            // Longest trailing run where every turn equals the one a period earlier
            let mut run = period;
            while run < turns.len() {
                let i = turns.len() - 1 - run;
                if turns[i].signature != turns[i + period].signature {
                    break;
                }
                run += 1;
            }
            let repetitions = run / period;
            if repetitions < min_repeats {
                return None;
            }
            let cycle = &turns[turns.len() - period..];
            let distinct: HashSet<&str> = cycle.iter().map(|t| t.signature.as_str()).collect();
            if distinct.len() < 2 {
                return None;
            }
            Some(LoopDetection::detected(
                LoopType::AlternatingPattern,
                join_names(cycle),
                LoopEvidence {
                    repetitions,
                    turns_examined: turns.len(),
                    signatures: cycle
                        .iter()
                        .map(|t| truncate(&t.signature, MAX_SIGNATURE_LEN))
                        .collect(),
                },
            ))
        })
    }
}

/// Distinct tool names, first-seen order.
fn join_names<'a>(turns: impl IntoIterator<Item = &'a Turn>) -> String {
    let mut names: Vec<&str> = Vec::new();
    for name in turns.into_iter().flat_map(|t| &t.tool_names) {
        if !names.contains(&name.as_str()) {
            names.push(name);
        }
    }
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::ToolCall;

    // ==================== Helpers ====================

    fn turn(call: ToolCall) -> Vec<Message> {
        vec![
            Message::assistant_tool_calls(vec![call]),
            Message::tool_result("id", "output"),
        ]
    }

    fn conversation(calls: Vec<ToolCall>) -> Vec<Message> {
        let mut messages = vec![Message::user("investigate the failing build")];
        for call in calls {
            messages.extend(turn(call));
        }
        messages
    }

    fn read(path: &str) -> ToolCall {
        ToolCall::new("Read").with_arg("file_path", path)
    }

    fn read_at(offset: i64) -> ToolCall {
        ToolCall::new("Read")
            .with_arg("file_path", "/var/log/build.log")
            .with_arg("offset", offset)
    }

    fn grep(pattern: &str) -> ToolCall {
        ToolCall::new("Grep").with_arg("pattern", pattern)
    }

    // ==================== Consecutive identical ====================

    #[test]
    fn test_four_identical_calls_loop() {
        let messages = conversation(vec![read("/a"), read("/a"), read("/a"), read("/a")]);
        let detection = LoopDetector::default().detect_loop(&messages);
        assert!(detection.has_loop);
        assert_eq!(detection.loop_type, Some(LoopType::ConsecutiveIdentical));
        assert_eq!(detection.tool_name, "Read");
        assert_eq!(detection.evidence.repetitions, 4);
    }

    #[test]
    fn test_key_order_does_not_hide_loop() {
        let a = ToolCall::new("Grep").with_arg("pattern", "x").with_arg("path", "src");
        let b = ToolCall::new("Grep").with_arg("path", "src").with_arg("pattern", "x");
        let messages = conversation(vec![a.clone(), b, a]);
        assert!(LoopDetector::default().detect_loop(&messages).has_loop);
    }

    #[test]
    fn test_below_threshold_is_not_a_loop() {
        let messages = conversation(vec![read("/a"), read("/a")]);
        let detection = LoopDetector::default().detect_loop(&messages);
        assert!(!detection.has_loop);
        assert_eq!(detection.evidence.turns_examined, 2);
    }

    #[test]
    fn test_incrementing_offsets_are_not_a_loop() {
        let messages = conversation(vec![read_at(0), read_at(200), read_at(400), read_at(600)]);
        assert!(!LoopDetector::default().detect_loop(&messages).has_loop);
    }

    #[test]
    fn test_varying_search_patterns_are_not_a_loop() {
        let messages = conversation(vec![grep("foo"), grep("bar"), grep("baz"), grep("qux")]);
        assert!(!LoopDetector::default().detect_loop(&messages).has_loop);
    }

    #[test]
    fn test_new_user_message_resets_history() {
        let mut messages = conversation(vec![read("/a"), read("/a"), read("/a")]);
        messages.push(Message::user("try something else"));
        assert!(!LoopDetector::default().detect_loop(&messages).has_loop);
    }

    #[test]
    fn test_window_bounds_history() {
        let messages = conversation(vec![read("/a"), read("/a"), read("/a")]);
        let detector = LoopDetector::new(LoopPolicy {
            window_messages: 4,
            ..LoopPolicy::default()
        });
        assert!(!detector.detect_loop(&messages).has_loop);
    }

    // ==================== Alternating ====================

    #[test]
    fn test_alternating_pair() {
        let messages = conversation(vec![read("/a"), grep("x"), read("/a"), grep("x")]);
        let detection = LoopDetector::default().detect_loop(&messages);
        assert!(detection.has_loop);
        assert_eq!(detection.loop_type, Some(LoopType::AlternatingPattern));
        assert_eq!(detection.tool_name, "Read, Grep");
        assert_eq!(detection.evidence.repetitions, 2);
        assert_eq!(detection.evidence.signatures.len(), 2);
    }

    #[test]
    fn test_period_three_cycle() {
        let cycle = [read("/a"), grep("x"), ToolCall::new("LS").with_arg("path", "/")];
        let calls = cycle.iter().chain(cycle.iter()).cloned().collect();
        let detection = LoopDetector::default().detect_loop(&conversation(calls));
        assert_eq!(detection.loop_type, Some(LoopType::AlternatingPattern));
        assert_eq!(detection.tool_name, "Read, Grep, LS");
    }

    #[test]
    fn test_same_names_different_arguments_do_not_alternate() {
        let messages = conversation(vec![read("/a"), grep("x"), read("/b"), grep("y")]);
        assert!(!LoopDetector::default().detect_loop(&messages).has_loop);
    }

    #[test]
    fn test_single_cycle_is_not_enough() {
        let messages = conversation(vec![grep("q"), read("/a"), grep("x")]);
        assert!(!LoopDetector::default().detect_loop(&messages).has_loop);
    }

    #[test]
    fn test_huge_cycle_limits_do_not_overflow() {
        let messages = conversation(vec![read("/a"), grep("x"), read("/a"), grep("x")]);
        let detector = LoopDetector::new(LoopPolicy {
            max_cycle_period: usize::MAX,
            min_cycle_repeats: usize::MAX,
            ..LoopPolicy::default()
        });
        assert!(!detector.detect_loop(&messages).has_loop);
    }

    #[test]
    fn test_case_variants_of_a_name_loop_together() {
        let messages = conversation(vec![
            read("/a"),
            ToolCall::new("read").with_arg("file_path", "/a"),
            read("/a"),
        ]);
        let detection = LoopDetector::default().detect_loop(&messages);
        assert!(detection.has_loop);
        assert_eq!(detection.loop_type, Some(LoopType::ConsecutiveIdentical));
        assert_eq!(detection.tool_name, "Read");
    }

    #[test]
    fn test_empty_conversation() {
        let detection = LoopDetector::default().detect_loop(&[]);
        assert!(!detection.has_loop);
        assert_eq!(detection.evidence.turns_examined, 0);
    }
}
