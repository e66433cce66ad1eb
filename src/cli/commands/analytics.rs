use clap::Subcommand;

use crate::cli::config::connect_signed_in;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AnalyticsCommands {
    #[command(about = "Totals and new-user growth")]
    Summary {
        #[arg(long, help = "Window in days (defaults to the configured window)")]
        days: Option<u32>,
    },
}

pub async fn handle(cmd: AnalyticsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = connect_signed_in().await?;

    match cmd {
        AnalyticsCommands::Summary { days } => {
            let days = days.unwrap_or(client.config().paging.analytics_days);
            let summary = client.analytics.summary(days).await?;

            match output_format {
                OutputFormat::Json => output_json("summary", &summary),
                OutputFormat::Text => {
                    println!("Last {} days", days);
                    println!("Users:     {}", summary.total_users);
                    println!("Posts:     {}", summary.total_posts);
                    println!("Comments:  {}", summary.total_comments);
                    println!(
                        "New users: {} ({}% of all users)",
                        summary.new_users,
                        summary.new_user_percentage()
                    );
                    Ok(())
                }
            }
        }
    }
}
