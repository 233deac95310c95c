//! GitHub collaborator: REST payloads, their mapping onto the conversation
//! model, and a thin async client.
//!
//! The mapping functions are pure and tolerate missing fields: an absent
//! user becomes `unknown`, an absent body becomes empty, a label without a
//! color gets the default color.

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::attention::AttentionLevel;
use crate::errors::TaskboardError;
use crate::labels::{DEFAULT_LABEL_COLOR, Label};
use crate::models::{
    Conversation, ConversationKind, ConversationState, Message, MessageAuthor, MessageKind,
    RepoRef, conversation_id,
};
use crate::timeline::{LabelEvent, LabelEventKind};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "taskboard";
const PER_PAGE: usize = 100;

/// A GitHub account as embedded in issue and comment payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubUser {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// "User", "Bot" or "Organization"
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
}

/// Issue labels arrive either as bare names or as full label objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GitHubLabel {
    Name(String),
    Full {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
}

impl GitHubLabel {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name.as_str(),
            Self::Full { name, .. } => name.as_deref().unwrap_or_default(),
        }
    }
}

/// Present on issues that are actually pull requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubPullRequestRef {
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// A GitHub issue or pull request (subset of fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Pull requests also come through the issues endpoint with this key set.
    #[serde(default)]
    pub pull_request: Option<GitHubPullRequestRef>,
}

/// A comment on an issue or pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    pub created_at: DateTime<Utc>,
}

/// An entry of the issue events timeline. Only `labeled` and `unlabeled`
/// carry a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssueEvent {
    pub event: String,
    #[serde(default)]
    pub label: Option<GitHubLabel>,
    pub created_at: DateTime<Utc>,
}

/// A repository the authenticated user can track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Known GitHub token prefixes.
const GITHUB_TOKEN_PREFIXES: &[&str] = &["ghp_", "github_pat_", "gho_", "ghu_", "ghs_", "ghr_"];

/// Format check only; says nothing about scopes or expiry.
pub fn is_valid_github_token(token: &str) -> bool {
    let token = token.trim();
    !token.is_empty()
        && GITHUB_TOKEN_PREFIXES
            .iter()
            .any(|prefix| token.starts_with(prefix))
}

pub fn author_from(user: Option<&GitHubUser>) -> MessageAuthor {
    let user = user.cloned().unwrap_or_default();
    MessageAuthor {
        login: user.login.unwrap_or_else(|| "unknown".to_string()),
        avatar_url: user.avatar_url.unwrap_or_default(),
        is_bot: user.account_type.as_deref() == Some("Bot"),
    }
}

/// Current labels, dropping entries without a name.
pub fn labels_from(labels: &[GitHubLabel]) -> Vec<Label> {
    labels
        .iter()
        .filter_map(|label| match label {
            GitHubLabel::Name(name) => Some(Label::new(name.clone())),
            GitHubLabel::Full { name, color } => name.as_ref().map(|name| {
                Label::with_color(
                    name.clone(),
                    color.clone().unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_string()),
                )
            }),
        })
        .filter(|label| !label.name.is_empty())
        .collect()
}

pub fn conversation_kind(issue: &GitHubIssue) -> ConversationKind {
    if issue.pull_request.is_some() {
        ConversationKind::PullRequest
    } else {
        ConversationKind::Issue
    }
}

pub fn conversation_state(issue: &GitHubIssue) -> ConversationState {
    let merged = issue
        .pull_request
        .as_ref()
        .is_some_and(|pr| pr.merged_at.is_some());
    match issue.state.as_str() {
        "open" => ConversationState::Open,
        _ if merged => ConversationState::Merged,
        _ => ConversationState::Closed,
    }
}

/// Map an issue payload onto a conversation. The last message and the
/// attention level are left empty; they depend on the comment thread.
pub fn issue_to_conversation(repo: &RepoRef, issue: &GitHubIssue) -> Conversation {
    let kind = conversation_kind(issue);
    Conversation {
        id: conversation_id(repo, kind, issue.number),
        repo: repo.clone(),
        kind,
        number: issue.number,
        title: issue.title.clone(),
        state: conversation_state(issue),
        labels: labels_from(&issue.labels),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        body: issue.body.clone().unwrap_or_default(),
        author: author_from(issue.user.as_ref()),
        last_message: None,
        attention_level: AttentionLevel::None,
    }
}

/// The issue or PR description as the first message of the thread.
pub fn issue_body_message(issue: &GitHubIssue) -> Message {
    let kind = match conversation_kind(issue) {
        ConversationKind::Issue => MessageKind::IssueBody,
        ConversationKind::PullRequest => MessageKind::PrBody,
    };
    Message {
        id: issue.id,
        author: author_from(issue.user.as_ref()),
        body: issue.body.clone().unwrap_or_default(),
        created_at: issue.created_at,
        kind,
        agent_phase: None,
    }
}

pub fn comment_to_message(comment: &GitHubComment) -> Message {
    Message {
        id: comment.id,
        author: author_from(comment.user.as_ref()),
        body: comment.body.clone().unwrap_or_default(),
        created_at: comment.created_at,
        kind: MessageKind::Comment,
        agent_phase: None,
    }
}

/// Keep only label changes, in the order the tracker emitted them.
pub fn events_to_label_events(events: &[GitHubIssueEvent]) -> Vec<LabelEvent> {
    events
        .iter()
        .filter_map(|event| {
            let kind = match event.event.as_str() {
                "labeled" => LabelEventKind::Labeled,
                "unlabeled" => LabelEventKind::Unlabeled,
                _ => return None,
            };
            let label = event.label.as_ref()?.name();
            if label.is_empty() {
                return None;
            }
            Some(LabelEvent {
                kind,
                label: label.to_string(),
                timestamp: event.created_at,
            })
        })
        .collect()
}

/// Async GitHub REST client bound to one token.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
}

#[derive(Serialize)]
struct LabelsRequest<'a> {
    labels: &'a [&'a str],
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct CreateIssueRequest<'a> {
    title: &'a str,
    body: &'a str,
    labels: &'a [&'a str],
}

impl GitHubClient {
    pub fn new(api_base: &str, token: &str) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .context("Invalid GitHub authorization header")?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create GitHub API client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.api_base)
            .with_context(|| format!("Invalid GitHub API base: {}", self.api_base))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("GitHub API base cannot be a base URL: {}", self.api_base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn issue_endpoint(
        &self,
        repo: &RepoRef,
        number: u64,
        rest: &[&str],
    ) -> anyhow::Result<reqwest::Url> {
        let number = number.to_string();
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str(), "issues"];
        segments.push(&number);
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn check(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let endpoint = response.url().path().trim_start_matches('/').to_string();
        Err(TaskboardError::GitHubStatus {
            status: status.as_u16(),
            endpoint,
        }
        .into())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: reqwest::Url,
        query: &[(&str, String)],
    ) -> anyhow::Result<T> {
        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;
        Self::check(response)?
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }

    /// Walk `page=1..` until a short page comes back.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: reqwest::Url,
    ) -> anyhow::Result<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1u32;
        loop {
            let batch: Vec<T> = self
                .get_json(
                    url.clone(),
                    &[
                        ("per_page", PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            let count = batch.len();
            all.extend(batch);
            if count < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    /// Most recently updated issues and pull requests, open and closed.
    pub async fn list_issues(&self, repo: &RepoRef) -> anyhow::Result<Vec<GitHubIssue>> {
        let url = self.endpoint(&["repos", &repo.owner, &repo.name, "issues"])?;
        let issues: Vec<GitHubIssue> = self
            .get_json(
                url,
                &[
                    ("state", "all".to_string()),
                    ("sort", "updated".to_string()),
                    ("direction", "desc".to_string()),
                    ("per_page", PER_PAGE.to_string()),
                ],
            )
            .await?;
        tracing::info!(repo = %repo, count = issues.len(), "Fetched issues");
        Ok(issues)
    }

    /// Repositories owned by the authenticated user, most recently updated
    /// first. One page, like the issue list.
    pub async fn list_user_repos(&self) -> anyhow::Result<Vec<GitHubRepo>> {
        let url = self.endpoint(&["user", "repos"])?;
        let repos: Vec<GitHubRepo> = self
            .get_json(
                url,
                &[
                    ("sort", "updated".to_string()),
                    ("type", "owner".to_string()),
                    ("per_page", PER_PAGE.to_string()),
                ],
            )
            .await?;
        tracing::info!(count = repos.len(), "Fetched user repositories");
        Ok(repos)
    }

    pub async fn get_issue(&self, repo: &RepoRef, number: u64) -> anyhow::Result<GitHubIssue> {
        let url = self.issue_endpoint(repo, number, &[])?;
        self.get_json(url, &[]).await
    }

    pub async fn list_comments(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> anyhow::Result<Vec<GitHubComment>> {
        let url = self.issue_endpoint(repo, number, &["comments"])?;
        self.get_all_pages(url).await
    }

    pub async fn list_events(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> anyhow::Result<Vec<GitHubIssueEvent>> {
        let url = self.issue_endpoint(repo, number, &["events"])?;
        self.get_all_pages(url).await
    }

    pub async fn add_label(&self, repo: &RepoRef, number: u64, label: &str) -> anyhow::Result<()> {
        let url = self.issue_endpoint(repo, number, &["labels"])?;
        let response = self
            .http
            .post(url)
            .json(&LabelsRequest { labels: &[label] })
            .send()
            .await
            .context("Failed to send add-label request to GitHub")?;
        Self::check(response)?;
        Ok(())
    }

    /// Removing a label that is not on the issue is not an error.
    pub async fn remove_label(
        &self,
        repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> anyhow::Result<()> {
        let url = self.issue_endpoint(repo, number, &["labels", label])?;
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .context("Failed to send remove-label request to GitHub")?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!(repo = %repo, number, label, "Label was not present");
            return Ok(());
        }
        Self::check(response)?;
        Ok(())
    }

    pub async fn post_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> anyhow::Result<GitHubComment> {
        let url = self.issue_endpoint(repo, number, &["comments"])?;
        let response = self
            .http
            .post(url)
            .json(&CommentRequest { body })
            .send()
            .await
            .context("Failed to send comment to GitHub")?;
        Self::check(response)?
            .json()
            .await
            .context("Failed to parse comment response from GitHub")
    }

    pub async fn create_issue(
        &self,
        repo: &RepoRef,
        title: &str,
        body: &str,
        labels: &[&str],
    ) -> anyhow::Result<GitHubIssue> {
        let url = self.endpoint(&["repos", &repo.owner, &repo.name, "issues"])?;
        let response = self
            .http
            .post(url)
            .json(&CreateIssueRequest {
                title,
                body,
                labels,
            })
            .send()
            .await
            .context("Failed to send create-issue request to GitHub")?;
        Self::check(response)?
            .json()
            .await
            .context("Failed to parse create-issue response from GitHub")
    }
}
