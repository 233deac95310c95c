//! Configuration for the taskboard, read from `.taskboard/taskboard.toml`.
//!
//! Settings are layered file → environment → CLI:
//!
//! ```toml
//! [github]
//! api_base = "https://api.github.com"
//! tracked_repos = ["acme/widgets"]
//! # token = "ghp_..."   (falls back to GITHUB_TOKEN)
//!
//! [markers]
//! agent_mention = "@claude"
//! auto_continue = "/continue"
//!
//! [dashboard]
//! show_completed = false
//! recent_limit = 10
//! inspect_comments = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::TaskboardError;
use crate::github::{DEFAULT_API_BASE, is_valid_github_token};
use crate::models::RepoRef;
use crate::phase::AgentMarkers;

pub const CONFIG_DIR: &str = ".taskboard";
pub const CONFIG_FILE: &str = "taskboard.toml";

/// `[github]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubSection {
    /// Personal access token (optional, prefer GITHUB_TOKEN)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// REST API root, for GitHub Enterprise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Repositories shown on the dashboard, as `owner/name`
    #[serde(default)]
    pub tracked_repos: Vec<String>,
}

/// `[dashboard]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSection {
    #[serde(default)]
    pub show_completed: bool,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// Fetch comments and label history of open conversations
    #[serde(default = "default_inspect_comments")]
    pub inspect_comments: bool,
}

fn default_recent_limit() -> usize {
    10
}

fn default_inspect_comments() -> bool {
    true
}

impl Default for DashboardSection {
    fn default() -> Self {
        Self {
            show_completed: false,
            recent_limit: default_recent_limit(),
            inspect_comments: default_inspect_comments(),
        }
    }
}

/// The complete taskboard.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskboardToml {
    #[serde(default)]
    pub github: GitHubSection,
    #[serde(default)]
    pub markers: AgentMarkers,
    #[serde(default)]
    pub dashboard: DashboardSection,
}

impl TaskboardToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| TaskboardError::ConfigReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(TaskboardError::ConfigParseFailed)?)
    }

    /// Load `taskboard.toml` from `config_dir`, or defaults if it is absent.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize taskboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Add `repo` to `[github] tracked_repos`. Returns false if it was
    /// already tracked.
    pub fn track_repo(&mut self, repo: &RepoRef) -> bool {
        let full_name = repo.full_name();
        if self
            .github
            .tracked_repos
            .iter()
            .any(|slug| slug.eq_ignore_ascii_case(&full_name))
        {
            return false;
        }
        self.github.tracked_repos.push(full_name);
        true
    }

    /// Remove `repo` from `[github] tracked_repos`. Returns false if it was
    /// not tracked.
    pub fn untrack_repo(&mut self, repo: &RepoRef) -> bool {
        let full_name = repo.full_name();
        let before = self.github.tracked_repos.len();
        self.github
            .tracked_repos
            .retain(|slug| !slug.eq_ignore_ascii_case(&full_name));
        self.github.tracked_repos.len() != before
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for slug in &self.github.tracked_repos {
            if slug.parse::<RepoRef>().is_err() {
                warnings.push(format!(
                    "Invalid tracked repo '{}': expected owner/repo",
                    slug
                ));
            }
        }

        if let Some(ref token) = self.github.token
            && !is_valid_github_token(token)
        {
            warnings.push("[github] token does not look like a GitHub token".to_string());
        }

        if let Some(ref api_base) = self.github.api_base
            && !api_base.starts_with("http://")
            && !api_base.starts_with("https://")
        {
            warnings.push(format!(
                "Invalid api_base '{}': expected an http(s) URL",
                api_base
            ));
        }

        if self.markers.agent_mention.trim().is_empty() {
            warnings.push(
                "Empty agent_mention: replies will not be recognised as human".to_string(),
            );
        }

        if self.dashboard.recent_limit == 0 {
            warnings.push("recent_limit is 0: the recent activity list will be empty".to_string());
        }

        warnings
    }
}

/// Directory holding the configuration file for a project.
pub fn get_taskboard_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_DIR)
}

/// Runtime configuration: taskboard.toml merged with environment and CLI.
#[derive(Debug, Clone)]
pub struct TaskboardConfig {
    pub project_dir: PathBuf,
    pub config_dir: PathBuf,
    pub toml: TaskboardToml,
    /// CLI override: `--token`
    pub cli_token: Option<String>,
}

impl TaskboardConfig {
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let config_dir = get_taskboard_dir(&project_dir);
        let toml = TaskboardToml::load_or_default(&config_dir)?;

        Ok(Self {
            project_dir,
            config_dir,
            toml,
            cli_token: None,
        })
    }

    pub fn with_cli_args(project_dir: PathBuf, token: Option<String>) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.cli_token = token.filter(|t| !t.trim().is_empty());
        Ok(config)
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// GitHub token (CLI → file → `GITHUB_TOKEN`).
    pub fn token(&self) -> Result<String, TaskboardError> {
        let token = self
            .cli_token
            .clone()
            .or_else(|| self.toml.github.token.clone())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(TaskboardError::MissingToken)?;
        if !is_valid_github_token(&token) {
            return Err(TaskboardError::InvalidToken);
        }
        Ok(token)
    }

    /// API root (`GITHUB_API_BASE` → file → public GitHub).
    pub fn api_base(&self) -> String {
        std::env::var("GITHUB_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.toml.github.api_base.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    /// Tracked repositories, parsed.
    pub fn tracked_repos(&self) -> Result<Vec<RepoRef>, TaskboardError> {
        self.toml
            .github
            .tracked_repos
            .iter()
            .map(|slug| slug.parse())
            .collect()
    }

    pub fn markers(&self) -> &AgentMarkers {
        &self.toml.markers
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}
