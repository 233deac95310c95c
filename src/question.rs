//! Heuristic detection of agent comments that ask the human something.
//!
//! Plain regex matching, no language understanding. The patterns lean
//! towards recall: a spurious "needs you" costs less than a missed question.

use regex::RegexSet;
use std::sync::LazyLock;

/// Named heuristics, in the order they are compiled into the set.
const QUESTION_PATTERNS: &[(&str, &str)] = &[
    ("trailing-question-mark", r"(?m)\?\s*$"),
    ("should-i", r"(?i)should I"),
    ("do-you-want", r"(?i)do you want"),
    ("please-clarify", r"(?i)please (clarify|confirm|specify)"),
    ("unsure", r"(?i)I('m| am) (unsure|not sure)"),
    ("which-approach", r"(?i)which (approach|option|method)"),
    ("could-you", r"(?i)could you (help|explain|tell)"),
    ("what-prefer", r"(?i)what .* prefer"),
    ("need-input", r"(?i)need .* (input|decision|guidance)"),
];

static QUESTION_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(QUESTION_PATTERNS.iter().map(|(_, pattern)| *pattern)).unwrap()
});

/// Whether the text looks like it is asking the reader a question.
pub fn looks_like_question(body: &str) -> bool {
    QUESTION_SET.is_match(body)
}

/// Names of the heuristics that matched, for logging.
pub fn matched_question_patterns(body: &str) -> Vec<&'static str> {
    QUESTION_SET
        .matches(body)
        .into_iter()
        .map(|idx| QUESTION_PATTERNS[idx].0)
        .collect()
}
