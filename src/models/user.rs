use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp::lenient;
use super::Post;
use crate::filter::Searchable;
use crate::types::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "super::de_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default, alias = "createdAt", with = "lenient")]
    pub created: Option<DateTime<Utc>>,
    /// Friend count; the server sends either the count or the list
    #[serde(default, deserialize_with = "super::de_count")]
    pub friends: u64,
}

/// Fields an UPDATE outcome may carry for a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub suspended: Option<bool>,
}

/// `GET /users/{id}`: the user plus their posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl Entity for User {
    type Patch = UserPatch;
    const RESOURCE: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(username) = &patch.username {
            self.username = Some(username.clone());
        }
        if let Some(email) = &patch.email {
            self.email = Some(email.clone());
        }
        if let Some(suspended) = patch.suspended {
            self.suspended = suspended;
        }
    }

    fn set_suspended(&mut self, suspended: bool) -> bool {
        self.suspended = suspended;
        true
    }
}

impl Searchable for User {
    const SEARCH_FIELDS: &'static [&'static str] = &["username", "email"];

    fn search_values(&self) -> Vec<Option<&str>> {
        vec![self.username.as_deref(), self.email.as_deref()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn friends_decode_from_count_or_list() {
        let counted: User = serde_json::from_value(json!({"id": "u2", "friends": 3})).unwrap();
        assert_eq!(counted.friends, 3);

        let listed: User = serde_json::from_value(json!({"id": "u3", "friends": ["u1", "u2"]})).unwrap();
        assert_eq!(listed.friends, 2);

        let missing: User = serde_json::from_value(json!({"id": "u4", "friends": null})).unwrap();
        assert_eq!(missing.friends, 0);
    }

    #[test]
    fn created_at_is_read() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "createdAt": "2024-03-05T10:00:00Z"
        }))
        .unwrap();
        assert!(user.created.is_some());
    }
}
