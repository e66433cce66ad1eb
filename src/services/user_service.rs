use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::listing_query;
use crate::api::envelope::{decode_field, decode_page};
use crate::api::{Cursor, Gateway, ListingKeys, Page};
use crate::collection::PageSource;
use crate::error::Result;
use crate::models::{User, UserDetail};
use crate::reconcile::Mutation;

const USERS: ListingKeys = ListingKeys::paged("users", "last_user");

const LIST_FAILED: &str = "Failed to load users. Please try again.";
const DETAIL_FAILED: &str = "Failed to load user details.";
const SUSPEND_FAILED: &str = "Failed to update user status.";
const DELETE_FAILED: &str = "Failed to delete user.";

#[derive(Serialize)]
struct SuspendRequest {
    suspended: bool,
}

#[derive(Clone)]
pub struct UserService {
    gateway: Arc<Gateway>,
}

impl UserService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, limit: usize, cursor: Option<&Cursor>) -> Result<Page<User>> {
        let body = self
            .gateway
            .get(&["users"], &listing_query(limit, cursor), LIST_FAILED)
            .await?;
        decode_page(&body, USERS)
    }

    pub async fn get(&self, id: &str) -> Result<UserDetail> {
        let body = self.gateway.get(&["users", id], &[], DETAIL_FAILED).await?;
        decode_field(&body, "user")
    }

    /// Suspend or reinstate a user
    pub async fn set_suspended(&self, id: &str, suspended: bool) -> Result<Mutation<User>> {
        self.gateway
            .post(
                &["users", id, "suspend"],
                &SuspendRequest { suspended },
                SUSPEND_FAILED,
            )
            .await?;
        tracing::info!(user = id, suspended, "user status changed");
        Ok(Mutation::suspend(id, suspended))
    }

    pub async fn delete(&self, id: &str) -> Result<Mutation<User>> {
        self.gateway.delete(&["users", id], DELETE_FAILED).await?;
        tracing::info!(user = id, "user deleted");
        Ok(Mutation::delete(id))
    }
}

#[async_trait]
impl PageSource<User> for UserService {
    async fn fetch_page(&self, limit: usize, cursor: Option<&Cursor>) -> Result<Page<User>> {
        self.list(limit, cursor).await
    }
}
