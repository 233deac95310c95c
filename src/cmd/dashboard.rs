//! Dashboard and thread views: `taskboard dashboard`, `taskboard show`.

use anyhow::{Context, Result};
use chrono::Utc;
use console::style;
use std::path::Path;

use taskboard::dashboard::{ConversationThread, DashboardView, load_conversations, load_thread};
use taskboard::models::ConversationRef;
use taskboard::ui::{conversation_block, message_header};

use crate::Cli;

pub async fn cmd_dashboard(
    cli: &Cli,
    project_dir: &Path,
    show_completed: bool,
    json: bool,
) -> Result<()> {
    let (config, client) = super::connect(cli, project_dir)?;
    let repos = config.tracked_repos()?;
    if repos.is_empty() {
        anyhow::bail!(
            "No tracked repositories. Add [github] tracked_repos to {}",
            config.config_file().display()
        );
    }

    let settings = &config.toml.dashboard;
    let conversations = load_conversations(
        &client,
        &repos,
        config.markers(),
        settings.inspect_comments,
    )
    .await?;
    let view = DashboardView::build(
        conversations,
        show_completed || settings.show_completed,
        settings.recent_limit,
    );

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&view).context("Failed to serialize dashboard")?
        );
        return Ok(());
    }

    let now = Utc::now();
    println!();
    println!("{}", style("Needs your attention").bold().cyan());
    println!();
    if view.attention.is_empty() {
        println!("  {}", style("Nothing needs you right now.").dim());
        println!();
    }
    for conversation in &view.attention {
        println!("{}", conversation_block(conversation, now));
        println!();
    }

    println!("{}", style("Recent activity").bold().cyan());
    println!();
    if view.recent.is_empty() {
        println!("  {}", style("No conversations yet.").dim());
        println!();
    }
    for conversation in &view.recent {
        println!("{}", conversation_block(conversation, now));
        println!();
    }

    Ok(())
}

pub async fn cmd_show(cli: &Cli, project_dir: &Path, reference: &str) -> Result<()> {
    let reference: ConversationRef = reference.parse()?;
    let (config, client) = super::connect(cli, project_dir)?;

    let issue = client
        .get_issue(&reference.repo, reference.number)
        .await
        .with_context(|| format!("Failed to fetch {}", reference))?;
    let thread = load_thread(&client, &reference.repo, &issue, config.markers()).await?;
    print_thread(&thread);
    Ok(())
}

/// Conversation summary followed by every message of the thread.
pub fn print_thread(thread: &ConversationThread) {
    let now = Utc::now();
    println!();
    println!("{}", conversation_block(&thread.conversation, now));
    println!(
        "     {}",
        style(format!(
            "{}, {}, {} messages",
            thread.conversation.kind.as_str(),
            thread.conversation.state.as_str(),
            thread.messages.len()
        ))
        .dim()
    );
    println!();
    println!("{}", style("─".repeat(60)).dim());

    for message in &thread.messages {
        println!();
        println!("{}", message_header(message, now));
        let body = message.body.trim();
        if body.is_empty() {
            println!("  {}", style("(no description)").dim());
        }
        for line in body.lines() {
            println!("  {}", line);
        }
    }
    println!();
}
