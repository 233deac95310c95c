//! Offline classification of a saved snapshot: `taskboard classify`.

use anyhow::{Context, Result};
use std::path::Path;

use taskboard::attention::attention_reason;
use taskboard::config::TaskboardConfig;
use taskboard::dashboard::ConversationSnapshot;

use super::dashboard::print_thread;

pub fn cmd_classify(project_dir: &Path, snapshot_path: &Path, json: bool) -> Result<()> {
    let config = TaskboardConfig::new(project_dir.to_path_buf())?;
    let content = std::fs::read_to_string(snapshot_path)
        .with_context(|| format!("Failed to read snapshot: {}", snapshot_path.display()))?;
    let snapshot = ConversationSnapshot::parse(&content)?;
    let thread = snapshot.to_thread(config.markers())?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&thread).context("Failed to serialize conversation")?
        );
        return Ok(());
    }

    let conversation = &thread.conversation;
    println!("{}: {}", conversation.reference(), conversation.attention_level);
    let reason = attention_reason(
        conversation.attention_level,
        &conversation.labels,
        conversation.kind,
    );
    if !reason.is_empty() {
        println!("{}", reason);
    }
    print_thread(&thread);
    Ok(())
}
