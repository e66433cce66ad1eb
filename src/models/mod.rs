pub mod admin;
pub mod analytics;
pub mod category;
pub mod log;
pub mod post;
pub mod task;
pub mod timestamp;
pub mod user;

pub use admin::Admin;
pub use analytics::AnalyticsSummary;
pub use category::{Category, CategoryDraft, CategoryPatch};
pub use log::AdminLogEntry;
pub use post::{Comment, Post, PostPatch};
pub use task::{CategoryCount, CommunityTask, TaskDraft, TaskPatch, TaskStats};
pub use user::{User, UserDetail, UserPatch};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept string or numeric ids and normalise them to strings
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Counts arrive as a number or as the list being counted. Anything else
/// counts as zero rather than failing the record.
pub(crate) fn de_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::Array(items) => items.len() as u64,
        _ => 0,
    })
}
