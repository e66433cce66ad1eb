//! Cursor-paginated, incrementally grown list for one resource type.
//!
//! `items` keeps server order and is only changed by page completion
//! (replace or append) and by the reconciler. `has_more` is derived from the
//! cursor so the two can never disagree. The `loading` flag serializes
//! fetches: a fetch is split into `begin_*` (synchronous, claims the flag)
//! and `complete` (applies the result, releases it). A fetch that is given
//! up before it completes hands the flag back with `release`.

pub mod controller;

use async_trait::async_trait;

use crate::api::{Cursor, Page};
use crate::error::{ClientError, Result};
use crate::reconcile::{reconcile, Applied, Mutation};
use crate::types::Entity;

pub use controller::{CollectionView, FetchOutcome, ResourceController};

/// Remote listing for one resource type
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, limit: usize, cursor: Option<&Cursor>) -> Result<Page<T>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    Replace,
    Append,
}

/// Claim on the store's single in-flight fetch
#[derive(Debug)]
#[must_use = "a claimed fetch must be completed or the store stays loading"]
pub struct PageRequest {
    pub limit: usize,
    pub cursor: Option<Cursor>,
    mode: FetchMode,
    ticket: u64,
}

#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    cursor: Option<Cursor>,
    page: usize,
    page_size: usize,
    in_flight: Option<u64>,
    next_ticket: u64,
}

impl<T: Entity> Collection<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            page: 0,
            page_size,
            in_flight: None,
            next_ticket: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Pages loaded so far (1 after the first page)
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// "Showing N of M": the page estimate clamped to what is actually loaded
    pub fn showing_count(&self) -> usize {
        self.page.saturating_mul(self.page_size).min(self.items.len())
    }

    fn claim(&mut self, limit: usize, cursor: Option<Cursor>, mode: FetchMode) -> PageRequest {
        self.next_ticket += 1;
        self.in_flight = Some(self.next_ticket);
        PageRequest {
            limit,
            cursor,
            mode,
            ticket: self.next_ticket,
        }
    }

    /// Claim a first-page fetch. `None` while another fetch is outstanding.
    pub fn begin_first_page(&mut self, page_size: usize) -> Option<PageRequest> {
        if self.is_loading() {
            tracing::debug!(resource = T::RESOURCE, "first page requested while loading, ignored");
            return None;
        }
        self.page_size = page_size;
        Some(self.claim(page_size, None, FetchMode::Replace))
    }

    /// Claim the next page. Fails when nothing is left or a fetch is outstanding.
    pub fn begin_next_page(&mut self) -> Result<PageRequest> {
        if self.is_loading() {
            return Err(ClientError::illegal_state(format!(
                "a {} page is already loading",
                T::RESOURCE
            )));
        }
        let cursor = self.cursor.clone().ok_or_else(|| {
            ClientError::illegal_state(format!("no more {} pages to load", T::RESOURCE))
        })?;
        Ok(self.claim(self.page_size, Some(cursor), FetchMode::Append))
    }

    /// Apply a finished fetch. Returns how many items arrived, or `None` when
    /// the request no longer holds the claim and its page was discarded.
    ///
    /// A failed fetch releases the claim and leaves items and cursor as they
    /// were.
    pub fn complete(&mut self, request: &PageRequest, result: Result<Page<T>>) -> Result<Option<usize>> {
        if self.in_flight != Some(request.ticket) {
            tracing::debug!(resource = T::RESOURCE, "discarding superseded page");
            return Ok(None);
        }
        self.in_flight = None;

        let page = result?;
        let received = page.items.len();
        match request.mode {
            FetchMode::Replace => {
                self.items = page.items;
                self.page = 1;
            }
            FetchMode::Append => {
                self.items.extend(page.items);
                self.page += 1;
            }
        }
        self.cursor = page.cursor;

        tracing::debug!(
            resource = T::RESOURCE,
            received,
            total = self.items.len(),
            has_more = self.has_more(),
            "page applied"
        );
        Ok(Some(received))
    }

    /// Apply a write outcome in place. Never touches the cursor.
    pub fn reconcile(&mut self, mutation: Mutation<T>) -> Applied {
        reconcile(&mut self.items, mutation)
    }

    /// `None` when another fetch was already outstanding
    pub async fn fetch_first_page<S>(&mut self, source: &S, page_size: usize) -> Result<Option<usize>>
    where
        S: PageSource<T> + ?Sized,
    {
        let Some(request) = self.begin_first_page(page_size) else {
            return Ok(None);
        };
        let result = source.fetch_page(request.limit, None).await;
        self.complete(&request, result)
    }

    pub async fn fetch_next_page<S>(&mut self, source: &S) -> Result<Option<usize>>
    where
        S: PageSource<T> + ?Sized,
    {
        let request = self.begin_next_page()?;
        let result = source.fetch_page(request.limit, request.cursor.as_ref()).await;
        self.complete(&request, result)
    }
}

impl<T> Collection<T> {
    /// Give up a claimed fetch without applying anything. Returns false when
    /// the request had already lost the claim.
    pub fn release(&mut self, request: &PageRequest) -> bool {
        if self.in_flight != Some(request.ticket) {
            return false;
        }
        self.in_flight = None;
        true
    }
}
