//! Repository selection: `taskboard repos`, `repos track`, `repos untrack`.

use anyhow::{Context, Result};
use chrono::Utc;
use console::style;
use serde::Serialize;
use std::path::Path;

use taskboard::config::{CONFIG_FILE, TaskboardToml, get_taskboard_dir};
use taskboard::github::GitHubRepo;
use taskboard::models::RepoRef;
use taskboard::ui::icons::CHECK;
use taskboard::ui::relative_time;

use super::super::ReposCommands;
use crate::Cli;

#[derive(Serialize)]
struct RepoListing<'a> {
    #[serde(flatten)]
    repo: &'a GitHubRepo,
    tracked: bool,
}

pub async fn cmd_repos(
    cli: &Cli,
    project_dir: &Path,
    command: Option<ReposCommands>,
    json: bool,
) -> Result<()> {
    match command {
        None | Some(ReposCommands::List) => list_repos(cli, project_dir, json).await,
        Some(ReposCommands::Track { repo }) => track(project_dir, &repo, true),
        Some(ReposCommands::Untrack { repo }) => track(project_dir, &repo, false),
    }
}

async fn list_repos(cli: &Cli, project_dir: &Path, json: bool) -> Result<()> {
    let (config, client) = super::connect(cli, project_dir)?;
    let tracked = config.tracked_repos()?;
    let repos = client
        .list_user_repos()
        .await
        .context("Failed to list repositories")?;

    let listings: Vec<RepoListing> = repos
        .iter()
        .map(|repo| RepoListing {
            repo,
            tracked: tracked
                .iter()
                .any(|t| t.full_name().eq_ignore_ascii_case(&repo.full_name)),
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&listings).context("Failed to serialize repositories")?
        );
        return Ok(());
    }

    println!();
    if listings.is_empty() {
        println!("  {}", style("No repositories found for this token.").dim());
        println!();
        return Ok(());
    }

    let now = Utc::now();
    for listing in &listings {
        let marker = if listing.tracked {
            style("tracked").green().to_string()
        } else {
            String::new()
        };
        let updated = listing
            .repo
            .updated_at
            .map(|at| relative_time(at, now))
            .unwrap_or_default();
        println!(
            "  {}{}  {}  {}",
            style(&listing.repo.full_name).bold(),
            if listing.repo.private { " (private)" } else { "" },
            style(updated).dim(),
            marker
        );
        if let Some(description) = listing.repo.description.as_deref()
            && !description.trim().is_empty()
        {
            println!("    {}", style(description.trim()).dim());
        }
    }
    println!();
    println!(
        "  {}",
        style("Use 'taskboard repos track <owner/repo>' to add one to the dashboard.").dim()
    );
    println!();
    Ok(())
}

/// Add or remove `repo` in `[github] tracked_repos`, creating taskboard.toml
/// if needed. Works offline.
fn track(project_dir: &Path, repo: &str, add: bool) -> Result<()> {
    let repo: RepoRef = repo.parse()?;
    let config_dir = get_taskboard_dir(project_dir);
    let config_path = config_dir.join(CONFIG_FILE);
    let mut toml = TaskboardToml::load_or_default(&config_dir)?;

    let changed = if add {
        toml.track_repo(&repo)
    } else {
        toml.untrack_repo(&repo)
    };
    if !changed {
        if add {
            println!("{} is already tracked", repo);
        } else {
            println!("{} is not tracked", repo);
        }
        return Ok(());
    }

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;
    }
    toml.save(&config_path)?;

    if add {
        println!("{}Tracking {}", CHECK, repo);
    } else {
        println!("{}Stopped tracking {}", CHECK, repo);
    }
    Ok(())
}
