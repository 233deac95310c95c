//! Agent phase resolution.
//!
//! The agent works through a plan → review → implement pipeline and marks
//! the current stage with a workflow label. Replaying the label timeline at a
//! comment's timestamp tells us which stage produced it.
//!
//! Some automation posts under a human-looking account. A comment from such
//! an account is trusted as human only when it starts with one of the
//! configured markers; otherwise, if a phase was active when it was posted,
//! it is attributed to the agent.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::labels::{PLAN_REVIEW, PLANNING, READY_TO_IMPLEMENT};
use crate::models::Message;
use crate::timeline::{LabelEvent, active_labels_at};

/// Stage of the agent pipeline that produced a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentPhase {
    Plan,
    Review,
    Implement,
}

impl AgentPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Review => "review",
            Self::Implement => "implement",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            Self::Plan => "Plan Agent",
            Self::Review => "Review Agent",
            Self::Implement => "Implement Agent",
        }
    }
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the phase active at `instant`.
///
/// When more than one phase label is active the later pipeline stage wins:
/// `ready-to-implement` > `plan-review` > `planning`.
pub fn resolve_phase(instant: DateTime<Utc>, events: &[LabelEvent]) -> Option<AgentPhase> {
    let active = active_labels_at(events, instant);
    if active.contains(READY_TO_IMPLEMENT) {
        Some(AgentPhase::Implement)
    } else if active.contains(PLAN_REVIEW) {
        Some(AgentPhase::Review)
    } else if active.contains(PLANNING) {
        Some(AgentPhase::Plan)
    } else {
        None
    }
}

/// Body prefixes that identify a comment as written by a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMarkers {
    /// Prefix a human uses to address the agent
    #[serde(default = "default_agent_mention")]
    pub agent_mention: String,
    /// Prefix of the automatic "keep going" nudge
    #[serde(default = "default_auto_continue")]
    pub auto_continue: String,
}

fn default_agent_mention() -> String {
    "@claude".to_string()
}

fn default_auto_continue() -> String {
    "/continue".to_string()
}

impl Default for AgentMarkers {
    fn default() -> Self {
        Self {
            agent_mention: default_agent_mention(),
            auto_continue: default_auto_continue(),
        }
    }
}

impl AgentMarkers {
    /// Whether the trimmed body starts with either marker (case-insensitive).
    pub fn is_human_comment(&self, body: &str) -> bool {
        let body = body.trim();
        starts_with_marker(body, &self.agent_mention)
            || starts_with_marker(body, &self.auto_continue)
    }
}

fn starts_with_marker(body: &str, marker: &str) -> bool {
    let marker = marker.trim();
    if marker.is_empty() {
        return false;
    }
    body.get(..marker.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(marker))
}

/// Annotate a single message with its agent phase.
///
/// - Issue and PR descriptions are returned unchanged.
/// - Bot messages get the resolved phase (possibly none).
/// - Non-bot messages without a human marker are promoted to bot-authored
///   when a phase resolves at their timestamp.
pub fn annotate_message(
    message: &Message,
    events: &[LabelEvent],
    markers: &AgentMarkers,
) -> Message {
    let mut annotated = message.clone();
    if message.kind.is_description() {
        return annotated;
    }

    if message.author.is_bot {
        annotated.agent_phase = resolve_phase(message.created_at, events);
        return annotated;
    }

    if markers.is_human_comment(&message.body) {
        return annotated;
    }

    if let Some(phase) = resolve_phase(message.created_at, events) {
        tracing::debug!(
            message_id = message.id,
            login = %message.author.login,
            phase = %phase,
            "Attributing unmarked comment to agent"
        );
        annotated.author.is_bot = true;
        annotated.agent_phase = Some(phase);
    }
    annotated
}

/// Annotate every message of one conversation. Each message is resolved
/// independently against the same event timeline.
pub fn annotate_messages(
    messages: &[Message],
    events: &[LabelEvent],
    markers: &AgentMarkers,
) -> Vec<Message> {
    messages
        .iter()
        .map(|m| annotate_message(m, events, markers))
        .collect()
}

/// The most recent bot-authored message, if any.
pub fn last_bot_message(messages: &[Message]) -> Option<&Message> {
    messages
        .iter()
        .filter(|m| m.author.is_bot)
        .max_by_key(|m| m.created_at)
}

/// Badge text for a message, `None` for human messages.
pub fn agent_badge(message: &Message) -> Option<&'static str> {
    if !message.author.is_bot {
        return None;
    }
    Some(message.agent_phase.map_or("Agent", |p| p.badge()))
}
