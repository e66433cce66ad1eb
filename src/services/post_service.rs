use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::listing_query;
use crate::api::envelope::{decode_field, decode_page};
use crate::api::{Cursor, Gateway, ListingKeys, Page};
use crate::collection::PageSource;
use crate::error::{ClientError, Result};
use crate::models::{Comment, Post, PostPatch};
use crate::reconcile::Mutation;

const POSTS: ListingKeys = ListingKeys::paged("posts", "last_post");

const LIST_FAILED: &str = "Failed to load posts. Please try again.";
const DETAIL_FAILED: &str = "Failed to load post details.";
const UPDATE_FAILED: &str = "Failed to update post.";
const DELETE_FAILED: &str = "Failed to delete post.";
const DELETE_COMMENT_FAILED: &str = "Failed to delete comment.";

#[derive(Serialize)]
struct ContentRequest<'a> {
    content: &'a str,
}

#[derive(Clone)]
pub struct PostService {
    gateway: Arc<Gateway>,
}

impl PostService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, limit: usize, cursor: Option<&Cursor>) -> Result<Page<Post>> {
        let body = self
            .gateway
            .get(&["posts"], &listing_query(limit, cursor), LIST_FAILED)
            .await?;
        decode_page(&body, POSTS)
    }

    /// Post with its comments
    pub async fn get(&self, id: &str) -> Result<Post> {
        let body = self.gateway.get(&["posts", id], &[], DETAIL_FAILED).await?;
        decode_field(&body, "post")
    }

    /// Replace a post's content. Blank content is rejected before sending.
    pub async fn update_content(&self, id: &str, content: &str) -> Result<Mutation<Post>> {
        if content.trim().is_empty() {
            return Err(ClientError::validation("content", "Content is required"));
        }
        self.gateway
            .put(&["posts", id, "content"], &ContentRequest { content }, UPDATE_FAILED)
            .await?;
        tracing::info!(post = id, "post content updated");
        Ok(Mutation::update(id, PostPatch::content(content)))
    }

    pub async fn delete(&self, id: &str) -> Result<Mutation<Post>> {
        self.gateway.delete(&["posts", id], DELETE_FAILED).await?;
        tracing::info!(post = id, "post deleted");
        Ok(Mutation::delete(id))
    }

    /// The outcome applies to the post's `comments` list
    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<Mutation<Comment>> {
        self.gateway
            .delete(
                &["posts", post_id, "comments", comment_id],
                DELETE_COMMENT_FAILED,
            )
            .await?;
        tracing::info!(post = post_id, comment = comment_id, "comment deleted");
        Ok(Mutation::delete(comment_id))
    }
}

#[async_trait]
impl PageSource<Post> for PostService {
    async fn fetch_page(&self, limit: usize, cursor: Option<&Cursor>) -> Result<Page<Post>> {
        self.list(limit, cursor).await
    }
}
