use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::timestamp::lenient;
use crate::filter::Searchable;
use crate::types::Entity;

/// Action types the console labels specially; anything else is shown as-is
pub const KNOWN_ACTIONS: &[&str] = &[
    "ADMIN_CREATED",
    "USER_DELETED",
    "USER_SUSPENDED",
    "USER_UNSUSPENDED",
    "POST_DELETED",
    "POST_EDITED",
    "COMMENT_DELETED",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminLogEntry {
    #[serde(deserialize_with = "super::de_id")]
    pub id: String,
    #[serde(default)]
    pub admin_id: Option<String>,
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub details: Value,
    #[serde(default, with = "lenient")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl AdminLogEntry {
    pub fn is_known_action(&self) -> bool {
        KNOWN_ACTIONS.contains(&self.action_type.as_str())
    }

    /// Severity used when rendering the action badge
    pub fn severity(&self) -> &'static str {
        match self.action_type.as_str() {
            "ADMIN_CREATED" => "primary",
            "USER_DELETED" | "POST_DELETED" | "COMMENT_DELETED" => "error",
            "USER_SUSPENDED" => "warning",
            "USER_UNSUSPENDED" => "success",
            "POST_EDITED" => "info",
            _ => "default",
        }
    }
}

impl Entity for AdminLogEntry {
    // Log entries are read-only
    type Patch = ();
    const RESOURCE: &'static str = "log";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, _patch: &()) {}
}

impl Searchable for AdminLogEntry {
    const SEARCH_FIELDS: &'static [&'static str] = &["action_type", "admin_id"];

    fn search_values(&self) -> Vec<Option<&str>> {
        vec![Some(self.action_type.as_str()), self.admin_id.as_deref()]
    }
}
