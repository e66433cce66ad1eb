use clap::Subcommand;
use serde_json::json;

use super::load_pages;
use crate::cli::config::connect_signed_in;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::collection::ResourceController;
use crate::models::Post;
use crate::reconcile::reconcile;
use crate::services::PostService;

#[derive(Subcommand)]
pub enum PostCommands {
    #[command(about = "List posts, newest first")]
    List {
        #[arg(long, default_value_t = 1, help = "Number of pages to load")]
        pages: usize,
        #[arg(long, help = "Filter loaded posts by content or author")]
        search: Option<String>,
    },

    #[command(about = "Show a post with its comments")]
    Show {
        #[arg(help = "Post ID")]
        id: String,
    },

    #[command(about = "Replace a post's content")]
    Edit {
        #[arg(help = "Post ID")]
        id: String,
        #[arg(help = "New content")]
        content: String,
    },

    #[command(about = "Delete a post")]
    Delete {
        #[arg(help = "Post ID")]
        id: String,
    },

    #[command(about = "Delete a comment from a post")]
    DeleteComment {
        #[arg(help = "Post ID")]
        post: String,
        #[arg(help = "Comment ID")]
        comment: String,
    },
}

pub async fn handle(cmd: PostCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = connect_signed_in().await?;

    match cmd {
        PostCommands::List { pages, search } => {
            let mut controller: ResourceController<Post, PostService> = client.posts_page();
            load_pages(&mut controller, pages, search).await?;
            let view = controller.view();

            if view.items.is_empty() {
                return output_empty_collection(&output_format, "posts", "No posts found");
            }

            match output_format {
                OutputFormat::Json => output_json("posts", &view)?,
                OutputFormat::Text => {
                    println!("{:<24} {:<16} {:>5} {:>5}  {}", "ID", "AUTHOR", "LIKES", "CMTS", "CONTENT");
                    println!("{}", "-".repeat(100));
                    for post in &view.items {
                        println!(
                            "{:<24} {:<16} {:>5} {:>5}  {}",
                            truncate(&post.id, 24),
                            truncate(post.username.as_deref().unwrap_or("-"), 16),
                            post.like,
                            post.comment,
                            truncate(post.content.as_deref().unwrap_or(""), 48)
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
        PostCommands::Show { id } => {
            let post = client.posts.get(&id).await?;

            match output_format {
                OutputFormat::Json => output_json("post", &post),
                OutputFormat::Text => {
                    println!("ID:      {}", post.id);
                    println!("Author:  {}", post.username.as_deref().unwrap_or("-"));
                    println!("Likes:   {}", post.like);
                    println!("Content: {}", post.content.as_deref().unwrap_or(""));
                    println!("Comments ({}):", post.comments.len());
                    for comment in &post.comments {
                        println!(
                            "  {:<24} {:<16} {}",
                            comment.id,
                            truncate(comment.username.as_deref().unwrap_or("-"), 16),
                            truncate(comment.content.as_deref().unwrap_or(""), 50)
                        );
                    }
                    Ok(())
                }
            }
        }
        PostCommands::Edit { id, content } => {
            let mutation = client.posts.update_content(&id, &content).await?;
            output_success(
                &output_format,
                &format!("Post '{}' updated", id),
                Some(json!({ "mutation": mutation })),
            )
        }
        PostCommands::Delete { id } => {
            let mutation = client.posts.delete(&id).await?;
            output_success(
                &output_format,
                &format!("Post '{}' deleted", id),
                Some(json!({ "mutation": mutation })),
            )
        }
        PostCommands::DeleteComment { post, comment } => {
            let mut detail = client.posts.get(&post).await?;
            let mutation = client.posts.delete_comment(&post, &comment).await?;
            let outcome = json!({ "mutation": mutation });
            reconcile(&mut detail.comments, mutation);

            output_success(
                &output_format,
                &format!(
                    "Comment '{}' deleted ({} comments remain on post '{}')",
                    comment,
                    detail.comments.len(),
                    post
                ),
                Some(outcome),
            )
        }
    }
}
