//! Conversation and message model shared by the core and the CLI.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attention::AttentionLevel;
use crate::errors::TaskboardError;
use crate::labels::Label;
use crate::phase::AgentPhase;

/// A GitHub repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split('/').collect();
        if parts.len() == 2 && !parts[0].is_empty() && !parts[1].is_empty() {
            Ok(Self::new(parts[0], parts[1]))
        } else {
            Err(TaskboardError::InvalidRepo(s.to_string()))
        }
    }
}

/// A single issue or pull request addressed as `owner/repo#number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRef {
    pub repo: RepoRef,
    pub number: u64,
}

impl FromStr for ConversationRef {
    type Err = TaskboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TaskboardError::InvalidConversationRef(s.to_string());
        let (repo, number) = s.trim().split_once('#').ok_or_else(invalid)?;
        let repo = repo.parse::<RepoRef>().map_err(|_| invalid())?;
        let number = number.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self { repo, number })
    }
}

impl fmt::Display for ConversationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    Issue,
    PullRequest,
}

impl ConversationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pull_request",
        }
    }

    /// Short form used in conversation ids.
    pub fn id_segment(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pr",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Open,
    Closed,
    Merged,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    IssueBody,
    PrBody,
    Comment,
    ReviewComment,
    System,
}

impl MessageKind {
    /// The opening description of an issue or PR, never an agent reply.
    pub fn is_description(&self) -> bool {
        matches!(self, Self::IssueBody | Self::PrBody)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub author: MessageAuthor,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub kind: MessageKind,
    /// Set only for bot-authored (or inferred bot-authored) messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_phase: Option<AgentPhase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// `{owner}-{repo}-{pr|issue}-{number}`
    pub id: String,
    pub repo: RepoRef,
    pub kind: ConversationKind,
    pub number: u64,
    pub title: String,
    pub state: ConversationState,
    pub labels: Vec<Label>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub author: MessageAuthor,
    pub last_message: Option<Message>,
    pub attention_level: AttentionLevel,
}

impl Conversation {
    pub fn reference(&self) -> ConversationRef {
        ConversationRef {
            repo: self.repo.clone(),
            number: self.number,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == ConversationState::Open
    }
}

pub fn conversation_id(repo: &RepoRef, kind: ConversationKind, number: u64) -> String {
    format!(
        "{}-{}-{}-{}",
        repo.owner,
        repo.name,
        kind.id_segment(),
        number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_ref_parse() {
        let repo: RepoRef = "acme/widgets".parse().unwrap();
        assert_eq!(repo.owner, "acme");
        assert_eq!(repo.name, "widgets");
        assert_eq!(repo.full_name(), "acme/widgets");
    }

    #[test]
    fn test_repo_ref_parse_rejects_malformed() {
        assert!("widgets".parse::<RepoRef>().is_err());
        assert!("acme/".parse::<RepoRef>().is_err());
        assert!("/widgets".parse::<RepoRef>().is_err());
        assert!("a/b/c".parse::<RepoRef>().is_err());
    }

    #[test]
    fn test_conversation_ref_parse() {
        let r: ConversationRef = "acme/widgets#42".parse().unwrap();
        assert_eq!(r.repo, RepoRef::new("acme", "widgets"));
        assert_eq!(r.number, 42);
        assert_eq!(r.to_string(), "acme/widgets#42");
    }

    #[test]
    fn test_conversation_ref_parse_rejects_malformed() {
        assert!("acme/widgets".parse::<ConversationRef>().is_err());
        assert!("acme/widgets#abc".parse::<ConversationRef>().is_err());
        assert!("widgets#3".parse::<ConversationRef>().is_err());
    }

    #[test]
    fn test_conversation_id_format() {
        let repo = RepoRef::new("acme", "widgets");
        assert_eq!(
            conversation_id(&repo, ConversationKind::Issue, 7),
            "acme-widgets-issue-7"
        );
        assert_eq!(
            conversation_id(&repo, ConversationKind::PullRequest, 8),
            "acme-widgets-pr-8"
        );
    }

    #[test]
    fn test_message_kind_is_description() {
        assert!(MessageKind::IssueBody.is_description());
        assert!(MessageKind::PrBody.is_description());
        assert!(!MessageKind::Comment.is_description());
        assert!(!MessageKind::ReviewComment.is_description());
    }
}
