//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module      | Commands handled            |
//! |-------------|-----------------------------|
//! | `dashboard` | `Dashboard`, `Show`         |
//! | `classify`  | `Classify`                  |
//! | `actions`   | `Reply`, `Approve`, `New`   |
//! | `repos`     | `Repos`                     |
//! | `config`    | `Config`                    |

pub mod actions;
pub mod classify;
pub mod config;
pub mod dashboard;
pub mod repos;

pub use actions::{cmd_approve, cmd_new, cmd_reply};
pub use classify::cmd_classify;
pub use config::cmd_config;
pub use dashboard::{cmd_dashboard, cmd_show};
pub use repos::cmd_repos;

use anyhow::{Context, Result};
use std::path::Path;

use taskboard::config::TaskboardConfig;
use taskboard::github::GitHubClient;

use crate::Cli;

/// Load configuration and build an authenticated GitHub client.
fn connect(cli: &Cli, project_dir: &Path) -> Result<(TaskboardConfig, GitHubClient)> {
    let config = TaskboardConfig::with_cli_args(project_dir.to_path_buf(), cli.token.clone())?;
    let token = config.token()?;
    let client = GitHubClient::new(&config.api_base(), &token)
        .context("Failed to set up GitHub client")?;
    Ok((config, client))
}
