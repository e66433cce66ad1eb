pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

#[derive(Parser)]
#[command(name = "optima")]
#[command(about = "Optima operator console - moderate users, posts, community tasks and admin activity")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Login, logout and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Browse, suspend and delete users")]
    Users {
        #[command(subcommand)]
        cmd: commands::users::UserCommands,
    },

    #[command(about = "Browse, edit and delete posts and comments")]
    Posts {
        #[command(subcommand)]
        cmd: commands::posts::PostCommands,
    },

    #[command(about = "Admin activity log")]
    Logs {
        #[command(subcommand)]
        cmd: commands::logs::LogCommands,
    },

    #[command(about = "Community task management")]
    Tasks {
        #[command(subcommand)]
        cmd: commands::tasks::TaskCommands,
    },

    #[command(about = "Community task categories")]
    Categories {
        #[command(subcommand)]
        cmd: commands::categories::CategoryCommands,
    },

    #[command(about = "Usage analytics")]
    Analytics {
        #[command(subcommand)]
        cmd: commands::analytics::AnalyticsCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Users { cmd } => commands::users::handle(cmd, output_format).await,
        Commands::Posts { cmd } => commands::posts::handle(cmd, output_format).await,
        Commands::Logs { cmd } => commands::logs::handle(cmd, output_format).await,
        Commands::Tasks { cmd } => commands::tasks::handle(cmd, output_format).await,
        Commands::Categories { cmd } => commands::categories::handle(cmd, output_format).await,
        Commands::Analytics { cmd } => commands::analytics::handle(cmd, output_format).await,
    }
}

/// Print a failed command's error. An expired session has already been
/// announced by the login boundary and is not repeated.
pub fn report_error(output_format: &OutputFormat, error: &anyhow::Error) -> anyhow::Result<()> {
    match error.downcast_ref::<ClientError>() {
        Some(client_error) if client_error.is_unauthorized() => Ok(()),
        Some(client_error) => utils::output_client_error(output_format, client_error),
        None => utils::output_error(output_format, &error.to_string(), None),
    }
}
