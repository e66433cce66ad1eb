use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::{Cursor, Page};
use crate::collection::PageSource;
use crate::error::{ClientError, Result};
use crate::models::User;

/// Minimal user fixture
pub fn user(id: &str, username: &str) -> User {
    User {
        id: id.to_string(),
        username: Some(username.to_string()),
        email: Some(format!("{username}@example.com")),
        suspended: false,
        created: None,
        friends: 0,
    }
}

/// Page source that replays queued responses in order and records each call
pub struct ScriptedSource<T> {
    responses: Mutex<VecDeque<Result<Page<T>>>>,
    calls: Mutex<Vec<(usize, Option<Cursor>)>>,
    gate: Option<Notify>,
}

impl<T> ScriptedSource<T> {
    pub fn new(responses: Vec<Result<Page<T>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Responses are held until `release` is called once per fetch
    pub fn gated(responses: Vec<Result<Page<T>>>) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new(responses)
        }
    }

    /// Split `items` into pages of `size`; every page but the last carries a cursor
    pub fn paged(items: Vec<T>, size: usize) -> Self {
        let mut pages = Vec::new();
        let mut rest = items;
        let mut n = 0;
        while !rest.is_empty() {
            let tail = rest.split_off(size.min(rest.len()));
            n += 1;
            let cursor = (!tail.is_empty()).then(|| Cursor::new(format!("page-{n}")));
            pages.push(Ok(Page::new(rest, cursor)));
            rest = tail;
        }
        Self::new(pages)
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<(usize, Option<Cursor>)> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl<T: Send + Sync> PageSource<T> for ScriptedSource<T> {
    async fn fetch_page(&self, limit: usize, cursor: Option<&Cursor>) -> Result<Page<T>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((limit, cursor.cloned()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::illegal_state("no scripted response left")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn paged_source_chains_cursors() {
        let items: Vec<User> = (0..5).map(|i| user(&i.to_string(), "u")).collect();
        let source = ScriptedSource::paged(items, 2);

        let first = source.fetch_page(2, None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.cursor, Some(Cursor::new("page-1")));

        source.fetch_page(2, first.cursor.as_ref()).await.unwrap();
        let last = source.fetch_page(2, None).await.unwrap();
        assert_eq!(last.items.len(), 1);
        assert!(last.cursor.is_none());
        assert!(source.fetch_page(2, None).await.is_err());
    }
}
