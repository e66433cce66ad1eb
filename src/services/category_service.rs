use async_trait::async_trait;
use std::sync::Arc;

use crate::api::envelope::{decode_field, decode_page};
use crate::api::{Cursor, Gateway, ListingKeys, Page};
use crate::collection::PageSource;
use crate::error::{ClientError, Result};
use crate::models::{Category, CategoryDraft, CategoryPatch};
use crate::reconcile::Mutation;

const CATEGORIES: ListingKeys = ListingKeys::unpaged("categories");
const BASE: [&str; 2] = ["community-tasks", "categories"];

const LIST_FAILED: &str = "Failed to load categories. Please try again.";
const CREATE_FAILED: &str = "Failed to create category.";
const UPDATE_FAILED: &str = "Failed to update category.";
const DELETE_FAILED: &str = "Failed to delete category.";

/// Task categories. The listing is returned whole, as a single page.
#[derive(Clone)]
pub struct CategoryService {
    gateway: Arc<Gateway>,
}

impl CategoryService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Page<Category>> {
        let body = self.gateway.get(&BASE, &[], LIST_FAILED).await?;
        decode_page(&body, CATEGORIES)
    }

    pub async fn create(&self, draft: &CategoryDraft) -> Result<Mutation<Category>> {
        draft.validate()?;
        let body = self.gateway.post(&BASE, draft, CREATE_FAILED).await?;
        let item: Category = decode_field(&body, "category")?;
        tracing::info!(category = %item.id, "category created");
        Ok(Mutation::Insert { item })
    }

    pub async fn update(&self, id: &str, patch: CategoryPatch) -> Result<Mutation<Category>> {
        if matches!(&patch.category_name, Some(name) if name.trim().is_empty()) {
            return Err(ClientError::validation("category_name", "Category name is required"));
        }
        self.gateway
            .put(&[BASE[0], BASE[1], id], &patch, UPDATE_FAILED)
            .await?;
        tracing::info!(category = id, "category updated");
        Ok(Mutation::update(id, patch))
    }

    pub async fn delete(&self, id: &str) -> Result<Mutation<Category>> {
        self.gateway.delete(&[BASE[0], BASE[1], id], DELETE_FAILED).await?;
        tracing::info!(category = id, "category deleted");
        Ok(Mutation::delete(id))
    }
}

#[async_trait]
impl PageSource<Category> for CategoryService {
    async fn fetch_page(&self, _limit: usize, _cursor: Option<&Cursor>) -> Result<Page<Category>> {
        self.list().await
    }
}
