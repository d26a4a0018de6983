//! Action-pair extraction from user text.
//!
//! A user message is split into clauses (sentence punctuation, commas and
//! coordinating words like "and"/"then"). In each clause the first known
//! action word becomes the verb and the words after it become the artifact:
//!
//! ```
//! use toolguard_domain::intent::action::extract_action_pairs;
//!
//! let pairs = extract_action_pairs("Read architecture.md and check recent changes");
//! assert_eq!(pairs.len(), 2);
//! assert_eq!(pairs[0].verb, "read");
//! assert_eq!(pairs[0].artifact, "architecture.md");
//! assert_eq!(pairs[1].verb, "check");
//! assert_eq!(pairs[1].artifact, "recent changes");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Verbs that imply changing files, running commands or otherwise acting.
pub const IMPLEMENTATION_VERBS: &[&str] = &[
    "implement", "create", "write", "add", "fix", "update", "modify", "edit", "change",
    "refactor", "build", "delete", "remove", "rename", "move", "install", "run", "execute",
    "deploy", "generate", "replace", "migrate", "configure", "setup", "make", "patch", "apply",
    "commit", "scaffold", "convert", "port", "rewrite", "optimize", "upgrade", "integrate",
    "test", "debug", "resolve", "bump", "format", "lint", "draft",
];

/// Implementation verbs strong enough to require tools without a file target.
pub const STRONG_IMPLEMENTATION_VERBS: &[&str] = &[
    "implement", "create", "build", "fix", "refactor", "write", "add", "delete", "remove",
    "rename", "install", "deploy", "migrate", "rewrite", "scaffold", "patch", "generate", "run",
    "execute", "commit", "upgrade",
];

/// Verbs that only read, analyse or ask.
pub const RESEARCH_VERBS: &[&str] = &[
    "read", "analyze", "analyse", "review", "check", "explain", "understand", "investigate",
    "explore", "look", "examine", "describe", "summarize", "summarise", "find", "search",
    "show", "list", "compare", "inspect", "study", "research", "tell", "audit", "evaluate",
    "assess", "trace", "learn", "browse", "scan", "view", "see", "identify", "outline",
    "what", "why", "how", "where", "which", "who", "when",
];

/// Verbs that write documentation.
pub const DOCUMENTATION_VERBS: &[&str] = &["document", "annotate", "comment"];

/// Words that start a question; only recognized as the first word of a clause.
const QUESTION_WORDS: &[&str] = &["what", "why", "how", "where", "which", "who", "when"];

/// Words dropped from the front of an artifact.
const ARTIFACT_STOPWORDS: &[&str] = &[
    "the", "a", "an", "me", "us", "my", "our", "this", "that", "these", "those", "at", "to",
    "for", "up", "out", "some", "all", "please", "into", "in", "on", "of", "it",
];

static CLAUSE_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[.!?;:]+(?:\s+|$)|,\s*|\n+|\s+(?:and then|and|then|also|but|after that|afterwards|plus)\s+")
        .expect("valid regex")
});

static FILE_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:[\w\-]+/[\w\-./]*|\b[\w\-]+\.(?:rs|go|py|js|jsx|ts|tsx|java|kt|rb|c|h|cc|cpp|hpp|cs|swift|toml|yaml|yml|json|xml|html|css|scss|sql|sh|md|rst|txt|lock|cfg|ini|proto|vue|svelte|lua|zig|ex|exs|php)\b)")
        .expect("valid regex")
});

static DOC_ARTIFACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\breadme\b|\bdocs?\b|\bdocumentation\b|\bchangelog\b|\bguide\b|\btutorial\b|\bwiki\b|\bdocstrings?\b|\bcomments?\b|\bapi reference\b|\.(?:md|rst|adoc)\b)")
        .expect("valid regex")
});

/// Nouns that point at code even without a file name.
const CODE_NOUNS: &[&str] = &[
    "file", "files", "function", "functions", "method", "methods", "class", "classes",
    "module", "modules", "struct", "component", "endpoint", "endpoints", "test", "tests",
    "code", "bug", "bugs", "script", "config", "configuration", "handler", "crate", "package",
    "repo", "repository", "codebase", "directory", "folder", "project", "service", "feature",
    "schema", "migration", "query", "api", "cli", "library", "dependency", "dependencies",
    "build", "pipeline", "workflow", "dockerfile", "makefile", "type", "trait", "interface",
];

/// Broad category of an action verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbKind {
    Implementation,
    Research,
    Documentation,
}

/// A (verb, artifact) extraction from user text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPair {
    /// Lemmatized, lowercase lead action word
    pub verb: String,
    /// Object/file/topic phrase following the verb (may be empty)
    pub artifact: String,
    pub kind: VerbKind,
}

impl ActionPair {
    pub fn is_implementation(&self) -> bool {
        self.kind == VerbKind::Implementation
    }

    pub fn is_research(&self) -> bool {
        self.kind == VerbKind::Research
    }

    pub fn is_strong_implementation(&self) -> bool {
        self.is_implementation() && STRONG_IMPLEMENTATION_VERBS.contains(&self.verb.as_str())
    }

    /// Whether the artifact names a file, path or piece of code.
    pub fn has_file_target(&self) -> bool {
        if FILE_TARGET.is_match(&self.artifact) {
            return true;
        }
        self.artifact
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .any(|w| CODE_NOUNS.contains(&w))
    }

    /// Whether the artifact names documentation.
    pub fn has_doc_artifact(&self) -> bool {
        DOC_ARTIFACT.is_match(&self.artifact)
    }
}

/// Extract action pairs from `text`, in order of appearance.
pub fn extract_action_pairs(text: &str) -> Vec<ActionPair> {
    CLAUSE_SPLIT
        .split(text)
        .filter_map(|clause| extract_from_clause(clause.trim()))
        .collect()
}

fn extract_from_clause(clause: &str) -> Option<ActionPair> {
    let words: Vec<&str> = clause.split_whitespace().collect();
    let first = words.first().map(|w| normalize_word(w))?;

    // Questions are research regardless of the verbs they mention
    let head = first.split(['\'', '\u{2019}']).next().unwrap_or_default();
    if QUESTION_WORDS.contains(&head) {
        return Some(ActionPair {
            verb: head.to_string(),
            artifact: artifact_from(&words[1..]),
            kind: VerbKind::Research,
        });
    }

    words.iter().enumerate().find_map(|(i, word)| {
        let (verb, kind) = classify_verb(&normalize_word(word))?;
        Some(ActionPair {
            verb,
            artifact: artifact_from(&words[i + 1..]),
            kind,
        })
    })
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Map a (possibly inflected) word to its verb lemma and kind.
fn classify_verb(word: &str) -> Option<(String, VerbKind)> {
    if word.is_empty() || QUESTION_WORDS.contains(&word) {
        return None;
    }
    lemma_candidates(word).into_iter().find_map(|lemma| {
        let kind = if DOCUMENTATION_VERBS.contains(&lemma.as_str()) {
            VerbKind::Documentation
        } else if IMPLEMENTATION_VERBS.contains(&lemma.as_str()) {
            VerbKind::Implementation
        } else if RESEARCH_VERBS.contains(&lemma.as_str()) {
            VerbKind::Research
        } else {
            return None;
        };
        Some((lemma, kind))
    })
}

fn lemma_candidates(word: &str) -> Vec<String> {
    let mut candidates = vec![word.to_string()];
    if let Some(stem) = word.strip_suffix("ing") {
        candidates.push(stem.to_string());
        candidates.push(format!("{stem}e"));
        // running → run
        let bytes = stem.as_bytes();
        if stem.is_ascii() && bytes.len() > 2 && bytes[bytes.len() - 1] == bytes[bytes.len() - 2] {
            candidates.push(stem[..stem.len() - 1].to_string());
        }
    }
    if let Some(stem) = word.strip_suffix("ied") {
        candidates.push(format!("{stem}y"));
    }
    if let Some(stem) = word.strip_suffix("ed") {
        candidates.push(stem.to_string());
        candidates.push(format!("{stem}e"));
    }
    if let Some(stem) = word.strip_suffix("es") {
        candidates.push(stem.to_string());
    }
    if let Some(stem) = word.strip_suffix('s') {
        candidates.push(stem.to_string());
    }
    candidates
}

fn artifact_from(words: &[&str]) -> String {
    let start = words
        .iter()
        .position(|w| !ARTIFACT_STOPWORDS.contains(&normalize_word(w).as_str()))
        .unwrap_or(words.len());
    words[start..]
        .iter()
        .map(|w| w.trim_end_matches(|c: char| matches!(c, ',' | '?' | '!' | ';' | ':')))
        .collect::<Vec<_>>()
        .join(" ")
}
