//! Content signal: does the plan text read like a plan or like a report?

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Checkmark glyphs used in completion summaries.
const CHECKMARKS: &[char] = &['\u{2705}', '\u{2714}', '\u{2611}', '\u{2713}'];

static COMPLETION_PHRASES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?im)(?:",
        r"\bcompleted successfully\b",
        r"|\bsuccessfully (?:completed|implemented|deployed|finished)\b",
        r"|\ball (?:the )?(?:tasks|steps|changes|items|todos)(?: are| have been)? (?:now )?(?:completed|complete|done|finished)\b",
        r"|\bready for (?:production|testing|review|deployment|release|use)\b",
        r"|\b(?:the )?(?:work|task|implementation|everything|feature|fix) (?:is|has been) (?:now )?(?:done|complete|completed|finished)\b",
        r"|\bi(?:'|\u{2019})?ve (?:now |already |successfully |just )*(?:implemented|updated|created|fixed|added|completed|finished|refactored|written|modified|made|removed|deployed)\b",
        r"|\bi have (?:now |already |successfully |just )*(?:implemented|updated|created|fixed|added|completed|finished|refactored|written|modified|made|removed|deployed)\b",
        r"|\ball (?:the )?tests (?:are )?(?:now )?(?:passing|pass|passed|green)\b",
        r"|\b(?:has|have) been (?:successfully )?(?:implemented|completed|fixed|added|updated|deployed|created|resolved)\b",
        r"|\bsummary of (?:the )?(?:changes|what (?:was|i) (?:done|did|changed))\b",
        r"|^\s*(?:[-*]\s*)?\[x\]",
        r")"
    ))
    .expect("valid regex")
});

static PLANNING_PHRASES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?im)(?:",
        r"^\s*(?:step\s*)?\d+[.):]\s+\S",
        r"|\b(?:i|we)(?: will|(?:'|\u{2019})ll| am going to| are going to|(?:'|\u{2019})m going to)\b",
        r"|\bnext,",
        r"|\bfirst,",
        r"|\bthen,? i\b",
        r"|\b(?:the )?plan is to\b",
        r"|\bproposed (?:changes|approach|steps)\b",
        r"|^\s*(?:plan|steps|approach)\s*:",
        r")"
    ))
    .expect("valid regex")
});

static NUMBERED_STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:step\s*)?(?:\d+[.):]|[-*])\s+\S").expect("valid regex")
});

/// A list item that opens with a past-tense verb reports work, it does not plan it.
static PAST_TENSE_STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?im)^\s*(?:step\s*)?(?:\d+[.):]|[-*])\s+(?:",
        r"updated|added|fixed|implemented|created|refactored|removed|wrote|written|modified|",
        r"changed|deployed|replaced|renamed|migrated|moved|deleted|installed|configured|",
        r"resolved|completed|finished|wired|extracted|introduced|converted|rewrote|cleaned|",
        r"bumped|merged|built|ran|tested|verified|enabled|disabled|switched|adjusted",
        r")\b[^\n]*",
    ))
    .expect("valid regex")
});

/// What the plan text looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSignal {
    /// Reports finished work (checkmarks, "all tests passing", ...)
    Completion,
    /// Enumerates future steps
    Planning,
    /// Neither
    Neutral,
}

impl ContentSignal {
    pub fn as_str(&self) -> &str {
        match self {
            ContentSignal::Completion => "completion",
            ContentSignal::Planning => "planning",
            ContentSignal::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for ContentSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify plan text. Completion language wins over planning language.
pub fn classify_plan_content(plan: &str) -> ContentSignal {
    if completion_indicator(plan).is_some() {
        ContentSignal::Completion
    } else if PLANNING_PHRASES.is_match(plan) {
        ContentSignal::Planning
    } else {
        ContentSignal::Neutral
    }
}

/// First completion indicator found in `plan`, for use in block reasons.
pub fn completion_indicator(plan: &str) -> Option<String> {
    if let Some(mark) = plan.chars().find(|c| CHECKMARKS.contains(c)) {
        return Some(mark.to_string());
    }
    if let Some(m) = COMPLETION_PHRASES.find(plan) {
        return Some(m.as_str().trim().to_string());
    }
    past_tense_report(plan)
}

/// First past-tense step, when most list items in `plan` are past tense.
fn past_tense_report(plan: &str) -> Option<String> {
    let steps = NUMBERED_STEP.find_iter(plan).count();
    let mut past = PAST_TENSE_STEP.find_iter(plan);
    let first = past.next()?;
    let past_count = 1 + past.count();
    (past_count * 2 > steps).then(|| first.as_str().trim().to_string())
}
