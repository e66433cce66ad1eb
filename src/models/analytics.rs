use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /analytics/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_posts: u64,
    #[serde(default)]
    pub total_comments: u64,
    #[serde(default)]
    pub new_users: u64,
    /// Anything else the summary reports (activity series, etc.)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalyticsSummary {
    /// New users as a whole percentage of all users
    pub fn new_user_percentage(&self) -> u64 {
        if self.new_users == 0 || self.total_users == 0 {
            return 0;
        }
        (self.new_users as f64 / self.total_users as f64 * 100.0).round() as u64
    }
}
