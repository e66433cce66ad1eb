use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::Serialize;

use super::{Collection, PageRequest, PageSource};
use crate::error::Result;
use crate::filter::{self, Searchable};
use crate::reconcile::{Applied, Mutation};
use crate::types::Entity;

/// What happened to a fetch once its response arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied { received: usize },
    /// Another fetch was already outstanding; nothing was sent
    Skipped,
    /// The response arrived after the controller was dropped or after its
    /// claim was given up, and was not applied
    Discarded,
}

/// Render-ready state of a controller
#[derive(Debug, Clone, Serialize)]
pub struct CollectionView<T> {
    pub items: Vec<T>,
    pub query: String,
    pub loaded: usize,
    pub showing: usize,
    pub has_more: bool,
    pub loading: bool,
    /// Pagination is offered only when not searching
    pub can_load_more: bool,
}

/// Page-level owner of one resource's collection.
///
/// Fetch futures hold only a weak handle to the store, so dropping the
/// controller while a fetch is in flight discards its result instead of
/// writing into a dead store.
pub struct ResourceController<T, S: ?Sized> {
    store: Arc<Mutex<Collection<T>>>,
    source: Arc<S>,
    page_size: usize,
    query: String,
}

fn lock<T>(store: &Mutex<Collection<T>>) -> MutexGuard<'_, Collection<T>> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loading claim carried by a fetch future. If the future is dropped before
/// the page lands, the claim goes back to the store.
struct Claim<T> {
    store: Weak<Mutex<Collection<T>>>,
    request: PageRequest,
    settled: bool,
}

impl<T> Drop for Claim<T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Some(store) = self.store.upgrade() {
            if lock(&store).release(&self.request) {
                tracing::debug!("fetch abandoned, loading claim released");
            }
        }
    }
}

impl<T, S> ResourceController<T, S>
where
    T: Entity,
    S: PageSource<T> + ?Sized + 'static,
{
    pub fn new(source: Arc<S>, page_size: usize) -> Self {
        Self {
            store: Arc::new(Mutex::new(Collection::new(page_size))),
            source,
            page_size,
            query: String::new(),
        }
    }

    /// Fetch the first page, replacing whatever is loaded
    pub fn first_page(&self) -> impl Future<Output = Result<FetchOutcome>> + Send + 'static {
        let request = lock(&self.store).begin_first_page(self.page_size);
        self.run(request)
    }

    /// Re-fetch from the start with a different page size (used to grow
    /// listings that have no cursor, such as admin logs)
    pub fn reload_with_limit(&self, limit: usize) -> impl Future<Output = Result<FetchOutcome>> + Send + 'static {
        let request = lock(&self.store).begin_first_page(limit);
        self.run(request)
    }

    /// Fetch and append the next page. Fails immediately if there is none
    /// or a fetch is already outstanding.
    pub fn next_page(&self) -> Result<impl Future<Output = Result<FetchOutcome>> + Send + 'static> {
        let request = lock(&self.store).begin_next_page()?;
        Ok(self.run(Some(request)))
    }

    fn run(&self, request: Option<PageRequest>) -> impl Future<Output = Result<FetchOutcome>> + Send + 'static {
        let source = Arc::clone(&self.source);
        let claim = request.map(|request| Claim {
            store: Arc::downgrade(&self.store),
            request,
            settled: false,
        });
        async move {
            let Some(mut claim) = claim else {
                return Ok(FetchOutcome::Skipped);
            };
            let result = source
                .fetch_page(claim.request.limit, claim.request.cursor.as_ref())
                .await;
            let Some(store) = claim.store.upgrade() else {
                tracing::debug!(resource = T::RESOURCE, "controller dropped, discarding page");
                return Ok(FetchOutcome::Discarded);
            };
            claim.settled = true;
            let completed = lock(&store).complete(&claim.request, result)?;
            Ok(match completed {
                Some(received) => FetchOutcome::Applied { received },
                None => FetchOutcome::Discarded,
            })
        }
    }

    /// Apply a write outcome to the loaded items
    pub fn apply(&self, mutation: Mutation<T>) -> Applied {
        lock(&self.store).reconcile(mutation)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn len(&self) -> usize {
        lock(&self.store).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.store).is_empty()
    }

    pub fn has_more(&self) -> bool {
        lock(&self.store).has_more()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.store).is_loading()
    }

    pub fn can_load_more(&self) -> bool {
        let store = lock(&self.store);
        store.has_more() && !store.is_loading() && self.query.is_empty()
    }

    /// Clone of everything loaded, unfiltered
    pub fn items(&self) -> Vec<T> {
        lock(&self.store).items().to_vec()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        lock(&self.store).get(id).cloned()
    }
}

impl<T, S> ResourceController<T, S>
where
    T: Entity + Searchable,
    S: PageSource<T> + ?Sized + 'static,
{
    /// Loaded items narrowed by the current query
    pub fn visible(&self) -> Vec<T> {
        let store = lock(&self.store);
        filter::apply(store.items(), &self.query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn view(&self) -> CollectionView<T> {
        let store = lock(&self.store);
        let items: Vec<T> = filter::apply(store.items(), &self.query)
            .into_iter()
            .cloned()
            .collect();
        CollectionView {
            items,
            query: self.query.clone(),
            loaded: store.len(),
            showing: store.showing_count(),
            has_more: store.has_more(),
            loading: store.is_loading(),
            can_load_more: store.has_more() && !store.is_loading() && self.query.is_empty(),
        }
    }
}
