use clap::Subcommand;

use crate::cli::config::connect_signed_in;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::collection::ResourceController;
use crate::models::AdminLogEntry;
use crate::services::LogService;

#[derive(Subcommand)]
pub enum LogCommands {
    #[command(about = "List recent admin actions")]
    List {
        #[arg(long, help = "Entries to load (defaults to the configured logs limit)")]
        limit: Option<usize>,
        #[arg(long, default_value_t = 0, help = "Press \"load more\" this many times")]
        more: usize,
        #[arg(long, help = "Filter loaded entries by action type or admin")]
        search: Option<String>,
    },
}

pub async fn handle(cmd: LogCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = connect_signed_in().await?;

    match cmd {
        LogCommands::List { limit, more, search } => {
            let step = client.config().paging.logs_step;
            let mut controller: ResourceController<AdminLogEntry, LogService> = client.logs_page();

            match limit {
                Some(limit) => controller.reload_with_limit(limit).await?,
                None => controller.first_page().await?,
            };
            // No cursor here: each "load more" asks for a bigger window
            for _ in 0..more {
                let grown = controller.len() + step;
                controller.reload_with_limit(grown).await?;
            }
            if let Some(query) = search {
                controller.set_query(query);
            }
            let view = controller.view();

            if view.items.is_empty() {
                return output_empty_collection(&output_format, "logs", "No admin activity recorded");
            }

            match output_format {
                OutputFormat::Json => output_json("logs", &view)?,
                OutputFormat::Text => {
                    println!("{:<20} {:<18} {:<24} {}", "WHEN", "ACTION", "ADMIN", "DETAILS");
                    println!("{}", "-".repeat(100));
                    for entry in &view.items {
                        let when = entry
                            .timestamp
                            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| "-".into());
                        println!(
                            "{:<20} {:<18} {:<24} {}",
                            when,
                            entry.action_type,
                            truncate(entry.admin_id.as_deref().unwrap_or("-"), 24),
                            truncate(&entry.details.to_string(), 40)
                        );
                    }
                    println!();
                    println!("{} entries loaded", view.loaded);
                }
            }
            Ok(())
        }
    }
}
