use clap::Subcommand;
use serde_json::json;

use super::load_pages;
use crate::cli::config::connect_signed_in;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::collection::ResourceController;
use crate::models::User;
use crate::services::UserService;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List users, newest first")]
    List {
        #[arg(long, default_value_t = 1, help = "Number of pages to load")]
        pages: usize,
        #[arg(long, help = "Filter loaded users by username or email")]
        search: Option<String>,
    },

    #[command(about = "Show a user and their posts")]
    Show {
        #[arg(help = "User ID")]
        id: String,
    },

    #[command(about = "Suspend a user")]
    Suspend {
        #[arg(help = "User ID")]
        id: String,
    },

    #[command(about = "Lift a user's suspension")]
    Unsuspend {
        #[arg(help = "User ID")]
        id: String,
    },

    #[command(about = "Delete a user")]
    Delete {
        #[arg(help = "User ID")]
        id: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = connect_signed_in().await?;

    match cmd {
        UserCommands::List { pages, search } => {
            let mut controller: ResourceController<User, UserService> = client.users_page();
            load_pages(&mut controller, pages, search).await?;
            let view = controller.view();

            if view.items.is_empty() {
                return output_empty_collection(&output_format, "users", "No users found");
            }

            match output_format {
                OutputFormat::Json => output_json("users", &view)?,
                OutputFormat::Text => {
                    println!("{:<24} {:<20} {:<30} {:<10} {}", "ID", "USERNAME", "EMAIL", "STATUS", "JOINED");
                    println!("{}", "-".repeat(100));
                    for user in &view.items {
                        let joined = user
                            .created
                            .map(|dt| dt.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "-".into());
                        println!(
                            "{:<24} {:<20} {:<30} {:<10} {}",
                            truncate(&user.id, 24),
                            truncate(user.username.as_deref().unwrap_or("-"), 20),
                            truncate(user.email.as_deref().unwrap_or("-"), 30),
                            if user.suspended { "suspended" } else { "active" },
                            joined
                        );
                    }
                    println!();
                    println!(
                        "{}",
                        listing_footer(view.showing, view.loaded, view.has_more, !view.query.is_empty())
                    );
                }
            }
            Ok(())
        }
        UserCommands::Show { id } => {
            let detail = client.users.get(&id).await?;

            match output_format {
                OutputFormat::Json => output_json("user", &detail),
                OutputFormat::Text => {
                    let user = &detail.user;
                    println!("ID:       {}", user.id);
                    println!("Username: {}", user.username.as_deref().unwrap_or("-"));
                    println!("Email:    {}", user.email.as_deref().unwrap_or("-"));
                    println!("Status:   {}", if user.suspended { "suspended" } else { "active" });
                    println!("Friends:  {}", user.friends);
                    println!("Posts:    {}", detail.posts.len());
                    for post in &detail.posts {
                        println!("  {:<24} {}", post.id, truncate(post.content.as_deref().unwrap_or(""), 60));
                    }
                    Ok(())
                }
            }
        }
        UserCommands::Suspend { id } => {
            let mutation = client.users.set_suspended(&id, true).await?;
            output_success(
                &output_format,
                &format!("User '{}' suspended", id),
                Some(json!({ "mutation": mutation })),
            )
        }
        UserCommands::Unsuspend { id } => {
            let mutation = client.users.set_suspended(&id, false).await?;
            output_success(
                &output_format,
                &format!("User '{}' unsuspended", id),
                Some(json!({ "mutation": mutation })),
            )
        }
        UserCommands::Delete { id } => {
            let mutation = client.users.delete(&id).await?;
            output_success(
                &output_format,
                &format!("User '{}' deleted", id),
                Some(json!({ "mutation": mutation })),
            )
        }
    }
}
