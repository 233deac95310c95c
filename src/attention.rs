//! Attention-level classification.
//!
//! Each conversation gets one urgency level, computed from its current
//! labels, its kind and the latest agent comment. The rules are evaluated
//! in a fixed order and the first match wins:
//!
//! | # | Condition                                                        | Level   |
//! |---|------------------------------------------------------------------|---------|
//! | 1 | `blocked`                                                        | Urgent  |
//! | 2 | `needs-human-input`                                              | Urgent  |
//! | 3 | `claude-working`, `planning`, `plan-review`, `ready-to-implement` | Working |
//! | 4 | `needs-review`                                                   | Review  |
//! | 5 | last bot comment looks like a question                           | Urgent  |
//! | 6 | pull request without `auto-merge`                                | Review  |
//! | 7 | anything else                                                    | None    |
//!
//! Unlabeled pull requests land on rule 6: silence on a PR is not the same as
//! "nothing to do", only an explicit `auto-merge` opts out.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::labels::{
    AUTO_MERGE, BLOCKED, CLAUDE_WORKING, Label, NEEDS_HUMAN_INPUT, NEEDS_REVIEW, PLAN_REVIEW,
    PLANNING, READY_TO_IMPLEMENT, has_label,
};
use crate::models::{ConversationKind, Message};
use crate::question::{looks_like_question, matched_question_patterns};

/// Urgency of a conversation, most urgent first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionLevel {
    Urgent,
    Review,
    Working,
    Info,
    #[default]
    None,
}

impl AttentionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Review => "review",
            Self::Working => "working",
            Self::Info => "info",
            Self::None => "none",
        }
    }

    /// Sort key: 1 is most urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 1,
            Self::Review => 2,
            Self::Working => 3,
            Self::Info => 4,
            Self::None => 5,
        }
    }

    /// Urgent, Review and Working are surfaced in the attention section;
    /// Info and None are ordinary activity.
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::Urgent | Self::Review | Self::Working)
    }

    /// Short badge shown next to a conversation.
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Urgent => "Needs you",
            Self::Review => "Review",
            Self::Working => "Agent working",
            Self::Info => "Info",
            Self::None => "",
        }
    }
}

impl fmt::Display for AttentionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const WORKING_LABELS: &[&str] = &[CLAUDE_WORKING, PLANNING, PLAN_REVIEW, READY_TO_IMPLEMENT];

/// Classify a conversation. Pure: same inputs, same level.
pub fn classify(
    labels: &[Label],
    last_bot_message: Option<&Message>,
    kind: ConversationKind,
) -> AttentionLevel {
    if has_label(labels, BLOCKED) {
        return AttentionLevel::Urgent;
    }
    if has_label(labels, NEEDS_HUMAN_INPUT) {
        return AttentionLevel::Urgent;
    }
    if WORKING_LABELS.iter().any(|name| has_label(labels, name)) {
        return AttentionLevel::Working;
    }
    if has_label(labels, NEEDS_REVIEW) {
        return AttentionLevel::Review;
    }
    if let Some(message) = last_bot_message.filter(|m| m.author.is_bot)
        && looks_like_question(&message.body)
    {
        tracing::debug!(
            message_id = message.id,
            patterns = ?matched_question_patterns(&message.body),
            "Last agent comment reads as a question"
        );
        return AttentionLevel::Urgent;
    }
    if kind == ConversationKind::PullRequest && !has_label(labels, AUTO_MERGE) {
        return AttentionLevel::Review;
    }
    AttentionLevel::None
}

/// One-line explanation of why a conversation has its level.
pub fn attention_reason(
    level: AttentionLevel,
    labels: &[Label],
    kind: ConversationKind,
) -> &'static str {
    match level {
        AttentionLevel::Urgent if has_label(labels, BLOCKED) => {
            "Agent is blocked and needs your help"
        }
        AttentionLevel::Urgent if has_label(labels, NEEDS_HUMAN_INPUT) => {
            "Agent needs your input"
        }
        AttentionLevel::Urgent => "Agent is asking you a question",
        AttentionLevel::Review if kind == ConversationKind::PullRequest => {
            "Pull request needs your review"
        }
        AttentionLevel::Review => "Waiting for your review",
        AttentionLevel::Working => "Agent is actively working on this task",
        AttentionLevel::Info => "Task completed",
        AttentionLevel::None => "",
    }
}
