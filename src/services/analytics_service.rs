use std::sync::Arc;

use crate::api::envelope::decode_field;
use crate::api::Gateway;
use crate::error::Result;
use crate::models::AnalyticsSummary;

const SUMMARY_FAILED: &str = "Failed to load analytics.";

#[derive(Clone)]
pub struct AnalyticsService {
    gateway: Arc<Gateway>,
}

impl AnalyticsService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Summary over the last `days` days
    pub async fn summary(&self, days: u32) -> Result<AnalyticsSummary> {
        let body = self
            .gateway
            .get(&["analytics", "summary"], &[("days", days.to_string())], SUMMARY_FAILED)
            .await?;
        decode_field(&body, "summary")
    }
}
