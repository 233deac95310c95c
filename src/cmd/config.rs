//! Configuration view and validation commands: `taskboard config`.

use anyhow::Result;

use super::super::ConfigCommands;

pub fn cmd_config(project_dir: &std::path::Path, command: Option<ConfigCommands>) -> Result<()> {
    use taskboard::config::{CONFIG_FILE, TaskboardConfig, TaskboardToml, get_taskboard_dir};

    let config_dir = get_taskboard_dir(project_dir);
    let config_path = config_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Taskboard Configuration");
            println!("=======================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                TaskboardToml::load(&config_path)?
            } else {
                println!("No taskboard.toml found at {}", config_path.display());
                println!("Using default configuration.");
                TaskboardToml::default()
            };
            println!();

            println!("[github]");
            if toml.github.token.is_some() {
                println!("  token = (set)");
            }
            if let Some(api_base) = &toml.github.api_base {
                println!("  api_base = \"{}\"", api_base);
            }
            println!("  tracked_repos = {:?}", toml.github.tracked_repos);
            println!();

            println!("[markers]");
            println!("  agent_mention = \"{}\"", toml.markers.agent_mention);
            println!("  auto_continue = \"{}\"", toml.markers.auto_continue);
            println!();

            println!("[dashboard]");
            println!("  show_completed = {}", toml.dashboard.show_completed);
            println!("  recent_limit = {}", toml.dashboard.recent_limit);
            println!("  inspect_comments = {}", toml.dashboard.inspect_comments);
            println!();

            // Effective values include env overrides
            let config = TaskboardConfig::new(project_dir.to_path_buf())?;
            println!("Effective values (with env overrides):");
            println!("  api_base = \"{}\"", config.api_base());
            let token = match config.token() {
                Ok(_) => "available".to_string(),
                Err(e) => e.to_string(),
            };
            println!("  token = {}", token);
            println!();

            if !config_path.exists() {
                println!("Run 'taskboard config init' to create a taskboard.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No taskboard.toml found. Using defaults (valid).");
                return Ok(());
            }

            let warnings = TaskboardConfig::new(project_dir.to_path_buf())?.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("taskboard.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !config_dir.exists() {
                std::fs::create_dir_all(&config_dir)?;
            }

            let toml = TaskboardToml::default();
            toml.save(&config_path)?;

            println!("Created taskboard.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [github] tracked_repos, api_base");
            println!("  - [markers] agent_mention, auto_continue");
            println!("  - [dashboard] show_completed, recent_limit");
            println!();
        }
    }

    Ok(())
}
