//! Plain-text rendering of conversations and messages for the terminal.

use chrono::{DateTime, Utc};
use console::{StyledObject, style};

use crate::attention::{AttentionLevel, attention_reason};
use crate::models::{Conversation, Message};
use crate::phase::agent_badge;
use crate::ui::icons;

const PREVIEW_CHARS: usize = 120;
const MAX_LABELS: usize = 3;

/// "just now", "5m ago", "3h ago", "2d ago", then the date.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}

/// Cut `text` to `max` characters, ending with "..." when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

/// One-line preview of a markdown body: markup characters dropped,
/// whitespace collapsed.
pub fn body_preview(body: &str) -> String {
    let plain: String = body
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '`' | '_' | '~' | '[' | ']'))
        .collect();
    let collapsed = plain.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&collapsed, PREVIEW_CHARS)
}

pub fn style_level<D>(level: AttentionLevel, value: D) -> StyledObject<D> {
    let styled = style(value);
    match level {
        AttentionLevel::Urgent => styled.red().bold(),
        AttentionLevel::Review => styled.yellow(),
        AttentionLevel::Working => styled.cyan(),
        AttentionLevel::Info => styled.blue(),
        AttentionLevel::None => styled.dim(),
    }
}

/// First `MAX_LABELS` label names, comma separated.
pub fn label_summary(conversation: &Conversation) -> String {
    conversation
        .labels
        .iter()
        .take(MAX_LABELS)
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Multi-line summary used in both dashboard sections.
pub fn conversation_block(conversation: &Conversation, now: DateTime<Utc>) -> String {
    let level = conversation.attention_level;
    let mut lines = Vec::new();

    let state = icons::state_icon(conversation.state)
        .map(|icon| icon.to_string())
        .unwrap_or_default();
    lines.push(format!(
        "{}{}{}{}  {}",
        icons::attention_icon(level),
        icons::kind_icon(conversation.kind),
        state,
        style(&conversation.title).bold(),
        style(relative_time(conversation.updated_at, now)).dim()
    ));

    let mut meta = format!("     {}", conversation.reference());
    if !level.badge().is_empty() {
        meta.push_str(&format!("  {}", style_level(level, level.badge())));
    }
    let labels = label_summary(conversation);
    if !labels.is_empty() {
        meta.push_str(&format!("  {}", style(format!("[{}]", labels)).dim()));
    }
    lines.push(meta);

    let reason = attention_reason(level, &conversation.labels, conversation.kind);
    if !reason.is_empty() {
        lines.push(format!("     {}", style_level(level, reason)));
    }

    let preview = conversation
        .last_message
        .as_ref()
        .map(|m| body_preview(&m.body))
        .unwrap_or_else(|| body_preview(&conversation.body));
    if !preview.is_empty() {
        lines.push(format!("     {}", style(preview).dim()));
    }

    lines.join("\n")
}

/// Header line of a message in a thread view.
pub fn message_header(message: &Message, now: DateTime<Utc>) -> String {
    let (icon, badge) = match agent_badge(message) {
        Some(badge) => (&icons::AGENT, format!(" {}", style(badge).magenta())),
        None => (&icons::HUMAN, String::new()),
    };
    format!(
        "{}{}{}  {}",
        icon,
        style(&message.author.login).bold(),
        badge,
        style(relative_time(message.created_at, now)).dim()
    )
}
