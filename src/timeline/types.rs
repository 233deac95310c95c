//! Label event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelEventKind {
    Labeled,
    Unlabeled,
}

/// A single label change on a conversation.
///
/// Produced once per fetch and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEvent {
    pub kind: LabelEventKind,
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

impl LabelEvent {
    pub fn labeled(label: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: LabelEventKind::Labeled,
            label: label.into(),
            timestamp,
        }
    }

    pub fn unlabeled(label: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind: LabelEventKind::Unlabeled,
            label: label.into(),
            timestamp,
        }
    }
}
