use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::lenient;
use crate::filter::Searchable;
use crate::types::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "super::de_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "createdAt", with = "lenient")]
    pub created: Option<DateTime<Utc>>,
    /// Like count
    #[serde(default, alias = "likeCount", deserialize_with = "super::de_count")]
    pub like: u64,
    /// Comment count
    #[serde(default, alias = "commentCount", deserialize_with = "super::de_count")]
    pub comment: u64,
    /// Only populated by `GET /posts/{id}`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(deserialize_with = "super::de_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "createdAt", with = "lenient")]
    pub created: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPatch {
    pub content: Option<String>,
}

impl PostPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

impl Entity for Post {
    type Patch = PostPatch;
    const RESOURCE: &'static str = "post";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: &PostPatch) {
        if let Some(content) = &patch.content {
            self.content = Some(content.clone());
        }
    }
}

impl Searchable for Post {
    const SEARCH_FIELDS: &'static [&'static str] = &["content", "username"];

    fn search_values(&self) -> Vec<Option<&str>> {
        vec![self.content.as_deref(), self.username.as_deref()]
    }
}

impl Entity for Comment {
    // Comments are only ever removed
    type Patch = ();
    const RESOURCE: &'static str = "comment";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, _patch: &()) {}
}

impl Searchable for Comment {
    const SEARCH_FIELDS: &'static [&'static str] = &["content", "username"];

    fn search_values(&self) -> Vec<Option<&str>> {
        vec![self.content.as_deref(), self.username.as_deref()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn camel_case_counts_and_timestamp_decode() {
        let post: Post = serde_json::from_value(json!({
            "id": "p1",
            "createdAt": "2024-01-01T00:00:00Z",
            "likeCount": 7,
            "commentCount": 3
        }))
        .unwrap();
        assert_eq!(post.created.map(|t| t.to_rfc3339()), Some("2024-01-01T00:00:00+00:00".to_string()));
        assert_eq!(post.like, 7);
        assert_eq!(post.comment, 3);

        let comment: Comment = serde_json::from_value(json!({
            "id": "c1",
            "createdAt": {"_seconds": 1704067200, "_nanoseconds": 0}
        }))
        .unwrap();
        assert!(comment.created.is_some());
    }

    #[test]
    fn null_counts_read_as_zero() {
        let post: Post = serde_json::from_value(json!({"id": 1, "likeCount": null, "comment": "n/a"})).unwrap();
        assert_eq!((post.like, post.comment), (0, 0));
    }
}
