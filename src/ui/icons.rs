//! Shared UI icons.
//!
//! Each icon falls back to a plain-text tag when the terminal cannot show
//! emoji.

use console::Emoji;

use crate::attention::AttentionLevel;
use crate::models::{ConversationKind, ConversationState};

// Attention levels
pub static URGENT: Emoji<'_, '_> = Emoji("🔴 ", "[!]");
pub static REVIEW: Emoji<'_, '_> = Emoji("🔍 ", "[R]");
pub static WORKING: Emoji<'_, '_> = Emoji("⚙️  ", "[W]");
pub static INFO: Emoji<'_, '_> = Emoji("✅ ", "[i]");
pub static IDLE: Emoji<'_, '_> = Emoji("   ", "   ");

// Conversation kinds and states
pub static ISSUE: Emoji<'_, '_> = Emoji("📝 ", "#");
pub static PULL_REQUEST: Emoji<'_, '_> = Emoji("🔀 ", "PR");
pub static MERGED: Emoji<'_, '_> = Emoji("🟣 ", "[M]");
pub static CLOSED: Emoji<'_, '_> = Emoji("⚫ ", "[C]");

// Message authors
pub static AGENT: Emoji<'_, '_> = Emoji("🤖 ", "[bot]");
pub static HUMAN: Emoji<'_, '_> = Emoji("👤 ", "[you]");

// Status
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");

pub fn attention_icon(level: AttentionLevel) -> &'static Emoji<'static, 'static> {
    match level {
        AttentionLevel::Urgent => &URGENT,
        AttentionLevel::Review => &REVIEW,
        AttentionLevel::Working => &WORKING,
        AttentionLevel::Info => &INFO,
        AttentionLevel::None => &IDLE,
    }
}

pub fn kind_icon(kind: ConversationKind) -> &'static Emoji<'static, 'static> {
    match kind {
        ConversationKind::Issue => &ISSUE,
        ConversationKind::PullRequest => &PULL_REQUEST,
    }
}

/// Only finished conversations get a state icon.
pub fn state_icon(state: ConversationState) -> Option<&'static Emoji<'static, 'static>> {
    match state {
        ConversationState::Open => None,
        ConversationState::Merged => Some(&MERGED),
        ConversationState::Closed => Some(&CLOSED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_fallbacks_are_distinct_per_level() {
        let fallbacks: Vec<String> = [
            AttentionLevel::Urgent,
            AttentionLevel::Review,
            AttentionLevel::Working,
            AttentionLevel::Info,
        ]
        .into_iter()
        .map(|level| attention_icon(level).1.to_string())
        .collect();
        let unique: HashSet<&String> = fallbacks.iter().collect();
        assert_eq!(unique.len(), fallbacks.len());
    }

    #[test]
    fn test_open_has_no_state_icon() {
        assert!(state_icon(ConversationState::Open).is_none());
        assert!(state_icon(ConversationState::Merged).is_some());
    }
}
