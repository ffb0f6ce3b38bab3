//! # ht - Height CLI
//!
//! A command-line client for the Height task tracker with an optional
//! terminal user interface (TUI).
//!
//! ## Key Features
//!
//! - **Action Menu TUI**: Pick a task and act on it (assign, status, priority,
//!   due date, parent, move, delete, copy) from a keyboard-driven menu
//! - **Scriptable CLI**: Every menu action is also a subcommand for automation
//! - **Live Feedback**: Each mutation reports pending, success or failure as
//!   it settles, in the TUI as toasts and on the CLI as console lines
//! - **Workspace-Aware**: Users, lists, statuses and priorities are resolved
//!   by name against a fresh workspace snapshot
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive action menu
//! ht ui
//!
//! # Or open it on a specific task
//! ht ui T-123
//!
//! # Assign a task via CLI
//! ht assign T-123 "Ada Lovelace"
//!
//! # Set a due date
//! ht due T-123 friday
//!
//! # List tasks
//! ht list --list Sprint
//! ```
//!
//! ## Configuration
//!
//! The API key is read from `--api-key`, then `HEIGHT_API_KEY`, then
//! `~/.config/height/config.json` (`{"apiKey": "..."}`). The same file can
//! set `baseUrl` and `theme`.

use clap::Parser;

pub mod api;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod dates;
pub mod directory;
pub mod feedback;
pub mod fields;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod menu;
    pub mod run;
    pub mod utils;
}

use api::HeightClient;
use cli::Cli;
use cmd::*;
use config::Config;

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // Completions need neither configuration nor network.
    if let Commands::Completions { shell } = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let config = match Config::resolve(cli.api_key, cli.theme) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(2);
        }
    };
    let client = match HeightClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to build API client: {e}");
            std::process::exit(2);
        }
    };

    match cli.command {
        Commands::Ui { task } => cmd_ui(client, config.theme, task).await,

        Commands::List { list, limit } => cmd_list(&client, list, limit).await,

        Commands::View { task } => cmd_view(&client, task).await,

        Commands::Assign { task, user, clear } => cmd_assign(&client, task, user, clear).await,

        Commands::Status { task, status } => cmd_status(&client, task, status).await,

        Commands::Priority { task, priority, clear } =>
            cmd_priority(&client, task, priority, clear).await,

        Commands::Due { task, due, clear } => cmd_due(&client, task, due, clear).await,

        Commands::Parent { task, parent, clear } =>
            cmd_parent(&client, task, parent, clear).await,

        Commands::Move { task, list } => cmd_move(&client, task, list).await,

        Commands::Delete { task, yes } => cmd_delete(&client, task, yes).await,

        Commands::Copy { task, content } => cmd_copy(&client, task, content).await,

        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}
