//! Client-side search over already-loaded items.
//!
//! Filtering never fetches: a query that matches nothing in the loaded window
//! just shows fewer rows. Callers recompute on every render from the current
//! items and query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::CommunityTask;

/// Declares which text fields the search box matches for an entity type.
pub trait Searchable {
    /// Field names, in the order `search_values` returns them
    const SEARCH_FIELDS: &'static [&'static str];

    fn search_values(&self) -> Vec<Option<&str>>;
}

/// Case-insensitive substring match against any declared field
pub fn matches<T: Searchable>(item: &T, query: &str) -> bool {
    let needle = query.to_lowercase();
    item.search_values()
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&needle))
}

/// Ordered subsequence of `items` matching `query`. Empty query is identity.
pub fn apply<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    if query.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|item| matches(*item, query)).collect()
}

/// Human-readable hint for a search box, e.g. "Search by username or email..."
pub fn placeholder<T: Searchable>() -> String {
    let fields: Vec<String> = T::SEARCH_FIELDS.iter().map(|f| f.replace('_', " ")).collect();
    let joined = match fields.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    };
    format!("Search by {joined}...")
}

/// Deadline window for the community task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskWindow {
    #[default]
    All,
    Active,
    Expired,
}

impl TaskWindow {
    pub fn admits(&self, task: &CommunityTask, now: DateTime<Utc>) -> bool {
        match self {
            TaskWindow::All => true,
            TaskWindow::Active => !task.is_expired_at(now),
            TaskWindow::Expired => task.is_expired_at(now),
        }
    }

    /// Narrow an already text-filtered view
    pub fn apply<'a>(&self, tasks: Vec<&'a CommunityTask>, now: DateTime<Utc>) -> Vec<&'a CommunityTask> {
        tasks.into_iter().filter(|task| self.admits(task, now)).collect()
    }
}

impl FromStr for TaskWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(TaskWindow::All),
            "active" => Ok(TaskWindow::Active),
            "expired" => Ok(TaskWindow::Expired),
            other => Err(format!("unknown task window '{other}' (expected all, active or expired)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Post, User};
    use chrono::Duration;

    fn user(id: &str, username: Option<&str>, email: Option<&str>) -> User {
        User {
            id: id.into(),
            username: username.map(Into::into),
            email: email.map(Into::into),
            suspended: false,
            created: None,
            friends: 0,
        }
    }

    fn users() -> Vec<User> {
        vec![
            user("1", Some("Alice"), Some("alice@example.com")),
            user("2", Some("bob"), Some("bob@corp.io")),
            user("3", None, Some("carol@EXAMPLE.com")),
        ]
    }

    #[test]
    fn empty_query_is_identity() {
        let items = users();
        let view = apply(&items, "");
        assert_eq!(view.len(), items.len());
        assert!(view.iter().zip(items.iter()).all(|(a, b)| std::ptr::eq(*a, b)));

        let empty: Vec<User> = Vec::new();
        assert!(apply(&empty, "").is_empty());
    }

    #[test]
    fn matches_any_field_case_insensitively() {
        let items = users();
        let ids: Vec<&str> = apply(&items, "example").iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let ids: Vec<&str> = apply(&items, "BOB").iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn missing_fields_never_match() {
        let items = vec![user("9", None, None)];
        assert!(apply(&items, "a").is_empty());
    }

    #[test]
    fn filter_preserves_server_order() {
        let items = users();
        let ids: Vec<&str> = apply(&items, "o").iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn declared_fields_line_up_with_values() {
        let u = user("1", Some("a"), Some("b"));
        assert_eq!(User::SEARCH_FIELDS.len(), u.search_values().len());
        assert_eq!(placeholder::<User>(), "Search by username or email...");
        assert_eq!(placeholder::<Post>(), "Search by content or username...");
    }

    #[test]
    fn task_window_composes_with_text_filter() {
        let now = Utc::now();
        let mk = |id: &str, title: &str, offset: i64| CommunityTask {
            id: id.into(),
            title: title.into(),
            category: None,
            reward_minutes: 10,
            deadline: Some(now + Duration::hours(offset)),
            created_at: None,
            updated_at: None,
            participants: Vec::new(),
            completed_by: Vec::new(),
        };
        let tasks = vec![mk("a", "Run", 2), mk("b", "Run far", -2), mk("c", "Read", 2)];

        let active = TaskWindow::Active.apply(apply(&tasks, "run"), now);
        assert_eq!(active.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["a"]);

        let expired = TaskWindow::Expired.apply(apply(&tasks, ""), now);
        assert_eq!(expired.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["b"]);

        assert_eq!("EXPIRED".parse::<TaskWindow>(), Ok(TaskWindow::Expired));
        assert!("soon".parse::<TaskWindow>().is_err());
    }
}
