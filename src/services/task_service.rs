use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use super::listing_query;
use crate::api::envelope::{decode_field, decode_page};
use crate::api::{Cursor, Gateway, ListingKeys, Page};
use crate::collection::PageSource;
use crate::error::Result;
use crate::models::{CommunityTask, TaskDraft, TaskPatch, TaskStats};
use crate::reconcile::Mutation;

const TASKS: ListingKeys = ListingKeys::paged("tasks", "last_task");

const LIST_FAILED: &str = "Failed to load community tasks. Please try again.";
const DETAIL_FAILED: &str = "Failed to load task details.";
const CREATE_FAILED: &str = "Failed to create task.";
const UPDATE_FAILED: &str = "Failed to update task.";
const DELETE_FAILED: &str = "Failed to delete task.";
const STATS_FAILED: &str = "Failed to load task statistics.";

#[derive(Clone)]
pub struct TaskService {
    gateway: Arc<Gateway>,
}

impl TaskService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, limit: usize, cursor: Option<&Cursor>) -> Result<Page<CommunityTask>> {
        let body = self
            .gateway
            .get(&["community-tasks"], &listing_query(limit, cursor), LIST_FAILED)
            .await?;
        decode_page(&body, TASKS)
    }

    pub async fn get(&self, id: &str) -> Result<CommunityTask> {
        let body = self
            .gateway
            .get(&["community-tasks", id], &[], DETAIL_FAILED)
            .await?;
        decode_field(&body, "task")
    }

    /// Validate and create a task; the created task is inserted at the front
    pub async fn create(&self, draft: &TaskDraft) -> Result<Mutation<CommunityTask>> {
        draft.validate(Utc::now())?;
        let body = self.gateway.post(&["community-tasks"], draft, CREATE_FAILED).await?;
        let item: CommunityTask = decode_field(&body, "community_task")?;
        tracing::info!(task = %item.id, "community task created");
        Ok(Mutation::Insert { item })
    }

    pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<Mutation<CommunityTask>> {
        patch.validate()?;
        self.gateway
            .put(&["community-tasks", id], &patch, UPDATE_FAILED)
            .await?;
        tracing::info!(task = id, "community task updated");
        Ok(Mutation::update(id, patch))
    }

    pub async fn delete(&self, id: &str) -> Result<Mutation<CommunityTask>> {
        self.gateway
            .delete(&["community-tasks", id], DELETE_FAILED)
            .await?;
        tracing::info!(task = id, "community task deleted");
        Ok(Mutation::delete(id))
    }

    pub async fn stats(&self) -> Result<TaskStats> {
        let body = self.gateway.get(&["community-tasks", "stats"], &[], STATS_FAILED).await?;
        decode_field(&body, "stats")
    }
}

#[async_trait]
impl PageSource<CommunityTask> for TaskService {
    async fn fetch_page(&self, limit: usize, cursor: Option<&Cursor>) -> Result<Page<CommunityTask>> {
        self.list(limit, cursor).await
    }
}
