use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::timestamp::{format_deadline, lenient};
use crate::error::{ClientError, Result};
use crate::filter::Searchable;
use crate::types::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityTask {
    #[serde(deserialize_with = "super::de_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reward_minutes: u32,
    #[serde(default, with = "lenient")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "lenient")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub participants: Vec<Value>,
    #[serde(default)]
    pub completed_by: Vec<Value>,
}

impl CommunityTask {
    /// A task with no readable deadline is treated as expired
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) => deadline <= now,
            None => true,
        }
    }

    /// Percentage of participants who completed the task, 0 when nobody joined
    pub fn completion_rate(&self) -> f64 {
        if self.participants.is_empty() {
            return 0.0;
        }
        (self.completed_by.len() as f64 / self.participants.len() as f64 * 100.0).round()
    }
}

/// Body of `POST /community-tasks`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub category: String,
    pub reward_minutes: u32,
    #[serde(serialize_with = "ser_deadline")]
    pub deadline: DateTime<Utc>,
}

impl TaskDraft {
    /// Checks the task form performs before submitting
    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ClientError::validation("title", "Title is required"));
        }
        if self.category.trim().is_empty() {
            return Err(ClientError::validation("category", "Category is required"));
        }
        if self.reward_minutes == 0 {
            return Err(ClientError::validation(
                "reward_minutes",
                "Reward must be a positive number of minutes",
            ));
        }
        if self.deadline <= now {
            return Err(ClientError::validation(
                "deadline",
                "Deadline must be in the future",
            ));
        }
        Ok(())
    }
}

/// Body of `PUT /community-tasks/{id}` and the matching UPDATE outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_minutes: Option<u32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "ser_opt_deadline",
        deserialize_with = "lenient::deserialize"
    )]
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.reward_minutes.is_none()
            && self.deadline.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ClientError::validation("task", "Nothing to update"));
        }
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            return Err(ClientError::validation("title", "Title is required"));
        }
        if matches!(&self.category, Some(c) if c.trim().is_empty()) {
            return Err(ClientError::validation("category", "Category is required"));
        }
        if self.reward_minutes == Some(0) {
            return Err(ClientError::validation(
                "reward_minutes",
                "Reward must be a positive number of minutes",
            ));
        }
        Ok(())
    }
}

fn ser_deadline<S: serde::Serializer>(dt: &DateTime<Utc>, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&format_deadline(dt))
}

fn ser_opt_deadline<S: serde::Serializer>(
    dt: &Option<DateTime<Utc>>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    match dt {
        Some(dt) => ser_deadline(dt, s),
        None => s.serialize_none(),
    }
}

impl Entity for CommunityTask {
    type Patch = TaskPatch;
    const RESOURCE: &'static str = "community task";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(category) = &patch.category {
            self.category = Some(category.clone());
        }
        if let Some(reward) = patch.reward_minutes {
            self.reward_minutes = reward;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = Some(deadline);
        }
    }
}

impl Searchable for CommunityTask {
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "category"];

    fn search_values(&self) -> Vec<Option<&str>> {
        vec![Some(self.title.as_str()), self.category.as_deref()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

/// `GET /community-tasks/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    #[serde(default)]
    pub total_tasks: u64,
    #[serde(default)]
    pub active_tasks: u64,
    #[serde(default)]
    pub expired_tasks: u64,
    #[serde(default)]
    pub total_participants: u64,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub tasks_by_category: Vec<CategoryCount>,
}
