//! Workflow labels and case-insensitive label lookup.
//!
//! The agent pipeline communicates its state through a small set of issue
//! labels. Everything else on an issue is ordinary metadata.

use serde::{Deserialize, Serialize};

pub const PLANNING: &str = "planning";
pub const PLAN_REVIEW: &str = "plan-review";
pub const READY_TO_IMPLEMENT: &str = "ready-to-implement";
pub const CLAUDE_WORKING: &str = "claude-working";
pub const NEEDS_REVIEW: &str = "needs-review";
pub const BLOCKED: &str = "blocked";
pub const NEEDS_HUMAN_INPUT: &str = "needs-human-input";
pub const AUTO_MERGE: &str = "auto-merge";

/// Labels with special meaning to the classifier. Only these are replayed
/// from the label-event timeline.
pub const WORKFLOW_LABELS: &[&str] = &[
    PLANNING,
    PLAN_REVIEW,
    READY_TO_IMPLEMENT,
    CLAUDE_WORKING,
    NEEDS_REVIEW,
    BLOCKED,
    NEEDS_HUMAN_INPUT,
    AUTO_MERGE,
];

/// Color used when the tracker returns a label without one.
pub const DEFAULT_LABEL_COLOR: &str = "888888";

/// A label currently attached to a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// RGB hex without the leading '#'
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_LABEL_COLOR.to_string()
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: default_color(),
        }
    }

    pub fn with_color(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }

    /// Case-insensitive name comparison.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Check whether `name` is present in `labels`, ignoring case.
pub fn has_label(labels: &[Label], name: &str) -> bool {
    labels.iter().any(|l| l.is(name))
}

/// Normalise a label name to the form used by the workflow allow-list.
/// Returns `None` for labels outside the allow-list.
pub fn workflow_label(name: &str) -> Option<&'static str> {
    WORKFLOW_LABELS
        .iter()
        .copied()
        .find(|w| w.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_label_ignores_case() {
        let labels = vec![Label::new("Blocked"), Label::new("bug")];
        assert!(has_label(&labels, BLOCKED));
        assert!(has_label(&labels, "BUG"));
        assert!(!has_label(&labels, NEEDS_REVIEW));
    }

    #[test]
    fn test_has_label_empty() {
        assert!(!has_label(&[], BLOCKED));
    }

    #[test]
    fn test_workflow_label_normalises() {
        assert_eq!(workflow_label("Planning"), Some(PLANNING));
        assert_eq!(workflow_label("READY-TO-IMPLEMENT"), Some(READY_TO_IMPLEMENT));
        assert_eq!(workflow_label(" auto-merge "), Some(AUTO_MERGE));
        assert_eq!(workflow_label("enhancement"), None);
    }

    #[test]
    fn test_label_default_color_on_deserialize() {
        let label: Label = serde_json::from_str(r#"{"name": "planning"}"#).unwrap();
        assert_eq!(label.color, DEFAULT_LABEL_COLOR);
    }
}
