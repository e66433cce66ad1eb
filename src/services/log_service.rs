use async_trait::async_trait;
use std::sync::Arc;

use crate::api::envelope::decode_page;
use crate::api::{Cursor, Gateway, ListingKeys, Page};
use crate::collection::PageSource;
use crate::error::Result;
use crate::models::AdminLogEntry;

// The logs endpoint has no cursor; callers grow the listing by asking for a
// larger limit and replacing what they have.
const LOGS: ListingKeys = ListingKeys::unpaged("logs");

const LIST_FAILED: &str = "Failed to load admin logs. Please try again.";

#[derive(Clone)]
pub struct LogService {
    gateway: Arc<Gateway>,
}

impl LogService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Most recent `limit` entries
    pub async fn list(&self, limit: usize) -> Result<Page<AdminLogEntry>> {
        let body = self
            .gateway
            .get(&["logs"], &[("limit", limit.to_string())], LIST_FAILED)
            .await?;
        decode_page(&body, LOGS)
    }
}

#[async_trait]
impl PageSource<AdminLogEntry> for LogService {
    async fn fetch_page(&self, limit: usize, _cursor: Option<&Cursor>) -> Result<Page<AdminLogEntry>> {
        self.list(limit).await
    }
}
