use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(
    version,
    about = "Triage GitHub issues and pull requests worked on by a coding agent"
)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// GitHub token. Overrides taskboard.toml and GITHUB_TOKEN.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show conversations that need you, then recent activity
    Dashboard {
        /// Include closed and merged conversations
        #[arg(long)]
        show_completed: bool,
        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one conversation with its annotated thread
    Show {
        /// Conversation reference, e.g. acme/widgets#12
        conversation: String,
    },
    /// Classify a saved conversation snapshot without touching the network
    Classify {
        /// JSON file with repo, issue, comments and events
        snapshot: PathBuf,
        /// Print the classified thread as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reply to the agent on a conversation
    Reply {
        conversation: String,
        body: String,
    },
    /// Approve the agent's plan and let it implement
    Approve { conversation: String },
    /// Open a new task for the agent
    New {
        /// Repository, e.g. acme/widgets
        repo: String,
        /// What the agent should do; the first line becomes the title
        request: String,
    },
    /// List your repositories and choose which ones the dashboard tracks
    Repos {
        #[command(subcommand)]
        command: Option<ReposCommands>,
        /// Print the repository list as JSON
        #[arg(long, global = true)]
        json: bool,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default taskboard.toml file
    Init,
}

#[derive(Subcommand, Clone)]
pub enum ReposCommands {
    /// List repositories owned by the authenticated user
    List,
    /// Add a repository to the dashboard
    Track {
        /// Repository, e.g. acme/widgets
        repo: String,
    },
    /// Remove a repository from the dashboard
    Untrack {
        /// Repository, e.g. acme/widgets
        repo: String,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Dashboard {
            show_completed,
            json,
        } => cmd::cmd_dashboard(&cli, &project_dir, *show_completed, *json).await?,
        Commands::Show { conversation } => cmd::cmd_show(&cli, &project_dir, conversation).await?,
        Commands::Classify { snapshot, json } => {
            cmd::cmd_classify(&project_dir, snapshot, *json)?
        }
        Commands::Reply { conversation, body } => {
            cmd::cmd_reply(&cli, &project_dir, conversation, body).await?
        }
        Commands::Approve { conversation } => {
            cmd::cmd_approve(&cli, &project_dir, conversation).await?
        }
        Commands::New { repo, request } => {
            cmd::cmd_new(&cli, &project_dir, repo, request).await?
        }
        Commands::Repos { command, json } => {
            cmd::cmd_repos(&cli, &project_dir, command.clone(), *json).await?
        }
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
    }

    Ok(())
}
