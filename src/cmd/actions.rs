//! Workflow actions: `taskboard reply`, `taskboard approve`, `taskboard new`.

use anyhow::Result;
use console::style;
use std::path::Path;

use taskboard::actions::{approve_plan, extract_issue_title, open_task, reply};
use taskboard::models::{ConversationRef, RepoRef};
use taskboard::ui::icons::CHECK;

use crate::Cli;

pub async fn cmd_reply(cli: &Cli, project_dir: &Path, reference: &str, body: &str) -> Result<()> {
    let reference: ConversationRef = reference.parse()?;
    if body.trim().is_empty() {
        anyhow::bail!("Reply body is empty");
    }
    let (config, client) = super::connect(cli, project_dir)?;

    let comment = reply(&client, &reference, config.markers(), body).await?;
    println!("{}Replied on {} (comment {})", CHECK, reference, comment.id);
    Ok(())
}

pub async fn cmd_approve(cli: &Cli, project_dir: &Path, reference: &str) -> Result<()> {
    let reference: ConversationRef = reference.parse()?;
    let (config, client) = super::connect(cli, project_dir)?;

    approve_plan(&client, &reference, config.markers()).await?;
    println!("{}Plan approved on {}", CHECK, reference);
    println!(
        "  {}",
        style("The agent will pick up implementation on its next run.").dim()
    );
    Ok(())
}

pub async fn cmd_new(cli: &Cli, project_dir: &Path, repo: &str, request: &str) -> Result<()> {
    let repo: RepoRef = repo.parse()?;
    if request.trim().is_empty() {
        anyhow::bail!("Task request is empty");
    }
    let (config, client) = super::connect(cli, project_dir)?;

    let issue = open_task(&client, &repo, config.markers(), request).await?;
    println!(
        "{}Opened {}#{}: {}",
        CHECK,
        repo,
        issue.number,
        style(extract_issue_title(request)).bold()
    );
    Ok(())
}
