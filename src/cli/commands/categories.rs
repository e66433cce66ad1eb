use clap::Subcommand;
use serde_json::json;

use crate::cli::config::connect_signed_in;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::collection::ResourceController;
use crate::models::{Category, CategoryDraft, CategoryPatch};
use crate::services::CategoryService;

#[derive(Subcommand)]
pub enum CategoryCommands {
    #[command(about = "List task categories")]
    List {
        #[arg(long, help = "Filter by name, type or description")]
        search: Option<String>,
    },

    #[command(about = "Create a category")]
    Create {
        #[arg(help = "Category name")]
        name: String,
        #[arg(long = "type", help = "Category type")]
        category_type: String,
        #[arg(long)]
        description: String,
    },

    #[command(about = "Update a category")]
    Update {
        #[arg(help = "Category ID")]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        category_type: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    #[command(about = "Delete a category")]
    Delete {
        #[arg(help = "Category ID")]
        id: String,
    },
}

pub async fn handle(cmd: CategoryCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = connect_signed_in().await?;

    match cmd {
        CategoryCommands::List { search } => {
            let mut controller: ResourceController<Category, CategoryService> = client.categories_page();
            controller.first_page().await?;
            if let Some(query) = search {
                controller.set_query(query);
            }
            let view = controller.view();

            if view.items.is_empty() {
                return output_empty_collection(&output_format, "categories", "No categories defined");
            }

            match output_format {
                OutputFormat::Json => output_json("categories", &view)?,
                OutputFormat::Text => {
                    println!("{:<24} {:<20} {:<14} {}", "ID", "NAME", "TYPE", "DESCRIPTION");
                    println!("{}", "-".repeat(90));
                    for category in &view.items {
                        println!(
                            "{:<24} {:<20} {:<14} {}",
                            truncate(&category.id, 24),
                            truncate(&category.category_name, 20),
                            truncate(category.category_type.as_deref().unwrap_or("-"), 14),
                            truncate(category.description.as_deref().unwrap_or(""), 40)
                        );
                    }
                }
            }
            Ok(())
        }
        CategoryCommands::Create { name, category_type, description } => {
            let draft = CategoryDraft {
                category_name: name,
                category_type,
                description,
            };
            let mutation = client.categories.create(&draft).await?;
            output_success(
                &output_format,
                &format!("Category '{}' created", draft.category_name),
                Some(json!({ "mutation": mutation })),
            )
        }
        CategoryCommands::Update { id, name, category_type, description } => {
            let patch = CategoryPatch {
                category_name: name,
                category_type,
                description,
            };
            let mutation = client.categories.update(&id, patch).await?;
            output_success(
                &output_format,
                &format!("Category '{}' updated", id),
                Some(json!({ "mutation": mutation })),
            )
        }
        CategoryCommands::Delete { id } => {
            let mutation = client.categories.delete(&id).await?;
            output_success(
                &output_format,
                &format!("Category '{}' deleted", id),
                Some(json!({ "mutation": mutation })),
            )
        }
    }
}
