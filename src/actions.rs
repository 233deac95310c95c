//! Human-side workflow actions: replying to the agent, approving a plan and
//! opening a new task.
//!
//! Every comment posted from here starts with the agent-mention marker, so
//! the phase resolver will always treat it as human-authored.

use anyhow::{Context, Result};

use crate::github::{GitHubClient, GitHubComment, GitHubIssue};
use crate::labels::PLANNING;
use crate::models::{ConversationRef, RepoRef};
use crate::phase::AgentMarkers;

const APPROVAL_TEXT: &str = "Plan approved. Proceed with implementation.";
const MAX_TITLE_CHARS: usize = 80;

/// Body of a reply addressed to the agent.
pub fn reply_body(markers: &AgentMarkers, text: &str) -> String {
    format!("{} {}", markers.agent_mention.trim(), text.trim())
}

/// Body of the comment that moves a planned task to implementation.
pub fn approval_body(markers: &AgentMarkers) -> String {
    reply_body(markers, APPROVAL_TEXT)
}

/// Derive an issue title from a free-form task request: the first non-empty
/// line, without markdown heading markers, cut to 80 characters.
pub fn extract_issue_title(request: &str) -> String {
    let line = request
        .lines()
        .map(|l| l.trim().trim_start_matches('#').trim())
        .find(|l| !l.is_empty())
        .unwrap_or("New task");

    if line.chars().count() <= MAX_TITLE_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(MAX_TITLE_CHARS - 3).collect();
    format!("{}...", cut.trim_end())
}

pub async fn reply(
    client: &GitHubClient,
    conversation: &ConversationRef,
    markers: &AgentMarkers,
    text: &str,
) -> Result<GitHubComment> {
    let body = reply_body(markers, text);
    client
        .post_comment(&conversation.repo, conversation.number, &body)
        .await
        .with_context(|| format!("Failed to reply on {}", conversation))
}

/// Drop the `planning` label, then post the approval comment that triggers
/// implementation.
pub async fn approve_plan(
    client: &GitHubClient,
    conversation: &ConversationRef,
    markers: &AgentMarkers,
) -> Result<GitHubComment> {
    client
        .remove_label(&conversation.repo, conversation.number, PLANNING)
        .await
        .with_context(|| format!("Failed to remove planning label on {}", conversation))?;
    tracing::info!(conversation = %conversation, "Removed planning label");

    client
        .post_comment(&conversation.repo, conversation.number, &approval_body(markers))
        .await
        .with_context(|| format!("Failed to post approval on {}", conversation))
}

/// Open a new issue that hands `request` to the agent.
pub async fn open_task(
    client: &GitHubClient,
    repo: &RepoRef,
    markers: &AgentMarkers,
    request: &str,
) -> Result<GitHubIssue> {
    let title = extract_issue_title(request);
    let body = reply_body(markers, request);
    client
        .create_issue(repo, &title, &body, &[])
        .await
        .with_context(|| format!("Failed to create issue in {}", repo))
}
