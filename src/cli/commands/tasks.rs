use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde_json::json;

use super::load_pages;
use crate::cli::config::connect_signed_in;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::collection::ResourceController;
use crate::filter::TaskWindow;
use crate::models::timestamp::parse_deadline;
use crate::models::{CommunityTask, TaskDraft, TaskPatch};
use crate::services::TaskService;

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(about = "List community tasks")]
    List {
        #[arg(long, default_value_t = 1, help = "Number of pages to load")]
        pages: usize,
        #[arg(long, default_value = "all", help = "Deadline window: all, active or expired")]
        window: TaskWindow,
        #[arg(long, help = "Filter loaded tasks by title or category")]
        search: Option<String>,
    },

    #[command(about = "Show one task")]
    Show {
        #[arg(help = "Task ID")]
        id: String,
    },

    #[command(about = "Create a task")]
    Create {
        #[arg(help = "Task title")]
        title: String,
        #[arg(long, help = "Category name")]
        category: String,
        #[arg(long, help = "Reward in minutes")]
        reward: u32,
        #[arg(long, help = "Deadline as DD/MM/YYYY HH:MM")]
        deadline: String,
    },

    #[command(about = "Update fields of a task")]
    Update {
        #[arg(help = "Task ID")]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, help = "Reward in minutes")]
        reward: Option<u32>,
        #[arg(long, help = "Deadline as DD/MM/YYYY HH:MM")]
        deadline: Option<String>,
    },

    #[command(about = "Delete a task")]
    Delete {
        #[arg(help = "Task ID")]
        id: String,
    },

    #[command(about = "Show task statistics")]
    Stats,
}

fn deadline_arg(input: &str) -> anyhow::Result<DateTime<Utc>> {
    parse_deadline(input)
        .ok_or_else(|| anyhow::anyhow!("Invalid deadline '{}', expected DD/MM/YYYY HH:MM", input))
}

pub async fn handle(cmd: TaskCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = connect_signed_in().await?;

    match cmd {
        TaskCommands::List { pages, window, search } => {
            let mut controller: ResourceController<CommunityTask, TaskService> = client.tasks_page();
            load_pages(&mut controller, pages, search).await?;

            let now = Utc::now();
            let mut view = controller.view();
            view.items.retain(|task| window.admits(task, now));

            if view.items.is_empty() {
                return output_empty_collection(&output_format, "tasks", "No community tasks found");
            }

            match output_format {
                OutputFormat::Json => output_json("tasks", &view)?,
                OutputFormat::Text => {
                    println!(
                        "{:<24} {:<28} {:<16} {:>6} {:<17} {:>5} {}",
                        "ID", "TITLE", "CATEGORY", "REWARD", "DEADLINE", "JOINED", "STATUS"
                    );
                    println!("{}", "-".repeat(110));
                    for task in &view.items {
                        let deadline = task
                            .deadline
                            .map(|dt| dt.format("%d/%m/%Y %H:%M").to_string())
                            .unwrap_or_else(|| "-".into());
                        println!(
                            "{:<24} {:<28} {:<16} {:>5}m {:<17} {:>5} {}",
                            truncate(&task.id, 24),
                            truncate(&task.title, 28),
                            truncate(task.category.as_deref().unwrap_or("-"), 16),
                            task.reward_minutes,
                            deadline,
                            task.participants.len(),
                            if task.is_expired_at(now) { "expired" } else { "active" }
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
        TaskCommands::Show { id } => {
            let task = client.tasks.get(&id).await?;

            match output_format {
                OutputFormat::Json => output_json("task", &task),
                OutputFormat::Text => {
                    println!("ID:         {}", task.id);
                    println!("Title:      {}", task.title);
                    println!("Category:   {}", task.category.as_deref().unwrap_or("-"));
                    println!("Reward:     {} minutes", task.reward_minutes);
                    match task.deadline {
                        Some(deadline) => println!("Deadline:   {}", deadline.format("%d/%m/%Y %H:%M")),
                        None => println!("Deadline:   -"),
                    }
                    println!("Joined:     {}", task.participants.len());
                    println!("Completed:  {}", task.completed_by.len());
                    println!("Completion: {}%", task.completion_rate());
                    Ok(())
                }
            }
        }
        TaskCommands::Create { title, category, reward, deadline } => {
            let draft = TaskDraft {
                title,
                category,
                reward_minutes: reward,
                deadline: deadline_arg(&deadline)?,
            };
            let mutation = client.tasks.create(&draft).await?;
            output_success(
                &output_format,
                &format!("Task '{}' created", mutation.id()),
                Some(json!({ "mutation": mutation })),
            )
        }
        TaskCommands::Update { id, title, category, reward, deadline } => {
            let patch = TaskPatch {
                title,
                category,
                reward_minutes: reward,
                deadline: deadline.as_deref().map(deadline_arg).transpose()?,
            };
            let mutation = client.tasks.update(&id, patch).await?;
            output_success(
                &output_format,
                &format!("Task '{}' updated", id),
                Some(json!({ "mutation": mutation })),
            )
        }
        TaskCommands::Delete { id } => {
            let mutation = client.tasks.delete(&id).await?;
            output_success(
                &output_format,
                &format!("Task '{}' deleted", id),
                Some(json!({ "mutation": mutation })),
            )
        }
        TaskCommands::Stats => {
            let stats = client.tasks.stats().await?;

            match output_format {
                OutputFormat::Json => output_json("stats", &stats),
                OutputFormat::Text => {
                    println!("Total tasks:        {}", stats.total_tasks);
                    println!("Active:             {}", stats.active_tasks);
                    println!("Expired:            {}", stats.expired_tasks);
                    println!("Participants:       {}", stats.total_participants);
                    println!("Completion rate:    {}%", stats.completion_rate);
                    if !stats.tasks_by_category.is_empty() {
                        println!("By category:");
                        for entry in &stats.tasks_by_category {
                            println!("  {:<20} {}", entry.name, entry.count);
                        }
                    }
                    Ok(())
                }
            }
        }
    }
}
