//! Dashboard assembly: turn fetched payloads into classified conversations
//! and split them into the attention and recent-activity sections.

use anyhow::{Context, Result};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::attention::classify;
use crate::github::{
    GitHubClient, GitHubComment, GitHubIssue, GitHubIssueEvent, comment_to_message,
    events_to_label_events, issue_body_message, issue_to_conversation,
};
use crate::models::{Conversation, Message, RepoRef};
use crate::phase::{AgentMarkers, annotate_messages, last_bot_message};
use crate::timeline::LabelEvent;

/// A conversation together with its annotated message thread.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationThread {
    pub conversation: Conversation,
    /// Description first, then comments in posting order.
    pub messages: Vec<Message>,
}

/// Classify one conversation from its raw messages and label history.
///
/// Messages are annotated with their agent phase, the latest comment
/// becomes `last_message`, and the latest agent-attributed comment feeds
/// the question rule.
pub fn build_conversation(
    repo: &RepoRef,
    issue: &GitHubIssue,
    messages: &[Message],
    events: &[LabelEvent],
    markers: &AgentMarkers,
) -> ConversationThread {
    let mut messages = annotate_messages(messages, events, markers);
    messages.sort_by_key(|m| (!m.kind.is_description(), m.created_at));

    let comments: Vec<Message> = messages
        .iter()
        .filter(|m| !m.kind.is_description())
        .cloned()
        .collect();

    let mut conversation = issue_to_conversation(repo, issue);
    conversation.attention_level = classify(
        &conversation.labels,
        last_bot_message(&comments),
        conversation.kind,
    );
    conversation.last_message = comments.into_iter().max_by_key(|m| m.created_at);

    ConversationThread {
        conversation,
        messages,
    }
}

/// Same as [`build_conversation`], starting from comment and event payloads.
pub fn build_thread(
    repo: &RepoRef,
    issue: &GitHubIssue,
    comments: &[GitHubComment],
    events: &[GitHubIssueEvent],
    markers: &AgentMarkers,
) -> ConversationThread {
    let mut messages = vec![issue_body_message(issue)];
    messages.extend(comments.iter().map(comment_to_message));
    let events = events_to_label_events(events);
    build_conversation(repo, issue, &messages, &events, markers)
}

/// Everything needed to classify one conversation offline, as saved from
/// the GitHub API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    /// `owner/name`
    pub repo: String,
    pub issue: GitHubIssue,
    #[serde(default)]
    pub comments: Vec<GitHubComment>,
    #[serde(default)]
    pub events: Vec<GitHubIssueEvent>,
}

impl ConversationSnapshot {
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse conversation snapshot")
    }

    pub fn to_thread(&self, markers: &AgentMarkers) -> Result<ConversationThread> {
        let repo: RepoRef = self.repo.parse()?;
        Ok(build_thread(
            &repo,
            &self.issue,
            &self.comments,
            &self.events,
            markers,
        ))
    }
}

/// The two dashboard sections.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardView {
    /// Conversations that need the human, most urgent first.
    pub attention: Vec<Conversation>,
    /// Most recently updated conversations.
    pub recent: Vec<Conversation>,
}

impl DashboardView {
    pub fn build(
        mut conversations: Vec<Conversation>,
        show_completed: bool,
        recent_limit: usize,
    ) -> Self {
        if !show_completed {
            conversations.retain(Conversation::is_open);
        }
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let mut attention: Vec<Conversation> = conversations
            .iter()
            .filter(|c| c.attention_level.needs_attention())
            .cloned()
            .collect();
        attention.sort_by_key(|c| c.attention_level.rank());

        conversations.truncate(recent_limit);
        Self {
            attention,
            recent: conversations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attention.is_empty() && self.recent.is_empty()
    }
}

/// Upper bound on thread fetches in flight for one repository.
pub const MAX_CONCURRENT_THREADS: usize = 8;

/// Fetch and classify the conversations of every tracked repository.
///
/// With `inspect_comments` set, comments and label events of open
/// conversations are fetched so the phase and question rules can apply;
/// otherwise classification uses labels and kind only.
///
/// A repository whose issue list cannot be fetched is skipped with a
/// warning. The call only fails when every repository failed.
pub async fn load_conversations(
    client: &GitHubClient,
    repos: &[RepoRef],
    markers: &AgentMarkers,
    inspect_comments: bool,
) -> Result<Vec<Conversation>> {
    let results = join_all(
        repos
            .iter()
            .map(|repo| load_repo(client, repo, markers, inspect_comments)),
    )
    .await;

    let mut conversations = Vec::new();
    let mut first_error = None;
    let mut loaded_any = false;
    for (repo, result) in repos.iter().zip(results) {
        match result {
            Ok(batch) => {
                loaded_any = true;
                conversations.extend(batch);
            }
            Err(e) => {
                tracing::warn!(repo = %repo, error = format!("{:#}", e), "Skipping repository");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) if !loaded_any => Err(e),
        _ => Ok(conversations),
    }
}

async fn load_repo(
    client: &GitHubClient,
    repo: &RepoRef,
    markers: &AgentMarkers,
    inspect_comments: bool,
) -> Result<Vec<Conversation>> {
    let issues = client
        .list_issues(repo)
        .await
        .with_context(|| format!("Failed to list issues for {}", repo))?;

    let threads: Vec<ConversationThread> = stream::iter(issues.iter().map(|issue| async move {
        if !inspect_comments || issue.state != "open" {
            return build_thread(repo, issue, &[], &[], markers);
        }
        match load_thread(client, repo, issue, markers).await {
            Ok(thread) => thread,
            Err(e) => {
                tracing::warn!(
                    repo = %repo,
                    number = issue.number,
                    error = format!("{:#}", e),
                    "Classifying from labels only"
                );
                build_thread(repo, issue, &[], &[], markers)
            }
        }
    }))
    .buffered(MAX_CONCURRENT_THREADS)
    .collect()
    .await;

    Ok(threads.into_iter().map(|t| t.conversation).collect())
}

/// Fetch comments and label events for one issue and classify it.
pub async fn load_thread(
    client: &GitHubClient,
    repo: &RepoRef,
    issue: &GitHubIssue,
    markers: &AgentMarkers,
) -> Result<ConversationThread> {
    let (comments, events) = futures::try_join!(
        client.list_comments(repo, issue.number),
        client.list_events(repo, issue.number),
    )
    .with_context(|| format!("Failed to load thread {}#{}", repo, issue.number))?;
    tracing::debug!(
        repo = %repo,
        number = issue.number,
        comments = comments.len(),
        events = events.len(),
        "Loaded conversation thread"
    );
    Ok(build_thread(repo, issue, &comments, &events, markers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attention::AttentionLevel;
    use crate::models::{ConversationKind, ConversationState, MessageKind};
    use crate::phase::AgentPhase;
    use chrono::{DateTime, Duration, Utc};
    use httpmock::prelude::*;
    use serde_json::json;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn snapshot(json: &str) -> ConversationSnapshot {
        ConversationSnapshot::parse(json).unwrap()
    }

    const PLANNING_SNAPSHOT: &str = r#"{
        "repo": "acme/widgets",
        "issue": {
            "id": 10, "number": 3, "title": "Add export", "state": "open",
            "body": "@claude add CSV export",
            "user": {"login": "alice", "type": "User"},
            "labels": [{"name": "planning", "color": "0e8a16"}],
            "created_at": "2025-03-01T09:00:00Z",
            "updated_at": "2025-03-01T12:00:00Z"
        },
        "comments": [
            {"id": 11, "body": "Here is the plan. Should I proceed?",
             "user": {"login": "alice", "type": "User"},
             "created_at": "2025-03-01T11:00:00Z"},
            {"id": 12, "body": "@claude looks good",
             "user": {"login": "alice", "type": "User"},
             "created_at": "2025-03-01T11:30:00Z"}
        ],
        "events": [
            {"event": "labeled", "label": {"name": "planning"}, "created_at": "2025-03-01T10:00:00Z"},
            {"event": "mentioned", "created_at": "2025-03-01T10:05:00Z"}
        ]
    }"#;

    fn conversation(number: u64, level: AttentionLevel, updated_secs: i64) -> Conversation {
        Conversation {
            id: number.to_string(),
            repo: RepoRef::new("acme", "widgets"),
            kind: ConversationKind::Issue,
            number,
            title: format!("Task {}", number),
            state: ConversationState::Open,
            labels: Vec::new(),
            created_at: at(0),
            updated_at: at(updated_secs),
            body: String::new(),
            author: Default::default(),
            last_message: None,
            attention_level: level,
        }
    }

    #[test]
    fn test_snapshot_thread_attributes_phases() {
        let thread = snapshot(PLANNING_SNAPSHOT)
            .to_thread(&AgentMarkers::default())
            .unwrap();
        assert_eq!(thread.messages.len(), 3);
        assert_eq!(thread.messages[0].kind, MessageKind::IssueBody);
        assert!(!thread.messages[0].author.is_bot);

        let plan = &thread.messages[1];
        assert!(plan.author.is_bot);
        assert_eq!(plan.agent_phase, Some(AgentPhase::Plan));

        let human = &thread.messages[2];
        assert!(!human.author.is_bot);
        assert_eq!(human.agent_phase, None);
    }

    #[test]
    fn test_snapshot_classification_and_last_message() {
        let thread = snapshot(PLANNING_SNAPSHOT)
            .to_thread(&AgentMarkers::default())
            .unwrap();
        let conversation = thread.conversation;
        assert_eq!(conversation.id, "acme-widgets-issue-3");
        assert_eq!(conversation.attention_level, AttentionLevel::Working);
        assert_eq!(conversation.last_message.map(|m| m.id), Some(12));
    }

    #[test]
    fn test_bot_question_without_labels_is_urgent() {
        let json = PLANNING_SNAPSHOT
            .replace(r#"[{"name": "planning", "color": "0e8a16"}]"#, "[]")
            .replace(r#""body": "@claude looks good","#, r#""body": "/continue","#);
        let thread = snapshot(&json).to_thread(&AgentMarkers::default()).unwrap();
        assert_eq!(thread.conversation.attention_level, AttentionLevel::Urgent);
    }

    #[test]
    fn test_snapshot_rejects_bad_repo() {
        let json = PLANNING_SNAPSHOT.replace("acme/widgets", "widgets");
        assert!(snapshot(&json).to_thread(&AgentMarkers::default()).is_err());
    }

    #[test]
    fn test_snapshot_parse_error() {
        assert!(ConversationSnapshot::parse("{not json").is_err());
    }

    #[test]
    fn test_description_only_has_no_last_message() {
        let snap = snapshot(PLANNING_SNAPSHOT);
        let thread = build_thread(
            &RepoRef::new("acme", "widgets"),
            &snap.issue,
            &[],
            &[],
            &AgentMarkers::default(),
        );
        assert!(thread.conversation.last_message.is_none());
        assert_eq!(thread.messages.len(), 1);
    }

    #[test]
    fn test_view_hides_closed_by_default() {
        let mut closed = conversation(1, AttentionLevel::Urgent, 100);
        closed.state = ConversationState::Closed;
        let open = conversation(2, AttentionLevel::None, 50);

        let view = DashboardView::build(vec![closed.clone(), open.clone()], false, 10);
        assert!(view.attention.is_empty());
        assert_eq!(view.recent.len(), 1);
        assert_eq!(view.recent[0].number, 2);

        let view = DashboardView::build(vec![closed, open], true, 10);
        assert_eq!(view.attention.len(), 1);
        assert_eq!(view.recent.len(), 2);
    }

    #[test]
    fn test_view_orders_attention_by_rank_then_recency() {
        let view = DashboardView::build(
            vec![
                conversation(1, AttentionLevel::Working, 300),
                conversation(2, AttentionLevel::Urgent, 100),
                conversation(3, AttentionLevel::Review, 200),
                conversation(4, AttentionLevel::Urgent, 250),
                conversation(5, AttentionLevel::None, 400),
            ],
            false,
            10,
        );
        let order: Vec<u64> = view.attention.iter().map(|c| c.number).collect();
        assert_eq!(order, vec![4, 2, 3, 1]);

        let recent: Vec<u64> = view.recent.iter().map(|c| c.number).collect();
        assert_eq!(recent, vec![5, 1, 4, 3, 2]);
    }

    #[test]
    fn test_view_recent_limit() {
        let conversations = (0..5)
            .map(|n| {
                let mut c = conversation(n, AttentionLevel::None, 0);
                c.updated_at = at(0) + Duration::seconds(n as i64);
                c
            })
            .collect();
        let view = DashboardView::build(conversations, false, 2);
        let recent: Vec<u64> = view.recent.iter().map(|c| c.number).collect();
        assert_eq!(recent, vec![4, 3]);
        assert!(!view.is_empty());
        assert!(DashboardView::build(Vec::new(), false, 2).is_empty());
    }

    // =========================================
    // Loading against a mock GitHub
    // =========================================

    fn issue_payload(number: u64, state: &str, labels: &[&str]) -> serde_json::Value {
        json!({
            "id": 1000 + number,
            "number": number,
            "title": format!("Task {}", number),
            "state": state,
            "labels": labels,
            "created_at": "2025-03-01T09:00:00Z",
            "updated_at": "2025-03-01T12:00:00Z"
        })
    }

    fn mock_client(server: &MockServer) -> GitHubClient {
        GitHubClient::new(&server.base_url(), "ghp_test").unwrap()
    }

    #[tokio::test]
    async fn test_failed_thread_fetch_falls_back_to_labels() {
        let server = MockServer::start();
        let issues = server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues");
            then.status(200).json_body(json!([
                issue_payload(3, "open", &["needs-review"]),
                issue_payload(4, "closed", &[]),
            ]));
        });
        let comments = server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/3/comments");
            then.status(403).body("secondary rate limit");
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/3/events");
            then.status(200).json_body(json!([]));
        });

        let conversations = load_conversations(
            &mock_client(&server),
            &[RepoRef::new("acme", "widgets")],
            &AgentMarkers::default(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(conversations.len(), 2);
        assert_eq!(conversations[0].number, 3);
        assert_eq!(conversations[0].attention_level, AttentionLevel::Review);
        assert!(conversations[0].last_message.is_none());
        assert_eq!(conversations[1].state, ConversationState::Closed);
        issues.assert();
        comments.assert();
    }

    #[tokio::test]
    async fn test_thread_fetch_classifies_from_comments() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues");
            then.status(200).json_body(json!([issue_payload(5, "open", &[])]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/5/comments");
            then.status(200).json_body(json!([{
                "id": 51,
                "body": "Should I keep the old API?",
                "user": {"login": "agent[bot]", "type": "Bot"},
                "created_at": "2025-03-01T11:00:00Z"
            }]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues/5/events");
            then.status(200).json_body(json!([]));
        });

        let conversations = load_conversations(
            &mock_client(&server),
            &[RepoRef::new("acme", "widgets")],
            &AgentMarkers::default(),
            true,
        )
        .await
        .unwrap();

        assert_eq!(conversations[0].attention_level, AttentionLevel::Urgent);
        assert_eq!(conversations[0].last_message.as_ref().map(|m| m.id), Some(51));
    }

    #[tokio::test]
    async fn test_failed_repo_is_skipped_unless_all_fail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/widgets/issues");
            then.status(200).json_body(json!([issue_payload(1, "open", &[])]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/broken/issues");
            then.status(500);
        });
        let client = mock_client(&server);
        let markers = AgentMarkers::default();

        let conversations = load_conversations(
            &client,
            &[RepoRef::new("acme", "broken"), RepoRef::new("acme", "widgets")],
            &markers,
            false,
        )
        .await
        .unwrap();
        assert_eq!(conversations.len(), 1);

        let err = load_conversations(&client, &[RepoRef::new("acme", "broken")], &markers, false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("acme/broken"));
    }
}
