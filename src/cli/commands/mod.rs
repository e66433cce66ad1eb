pub mod analytics;
pub mod auth;
pub mod categories;
pub mod logs;
pub mod posts;
pub mod tasks;
pub mod users;

use crate::collection::{PageSource, ResourceController};
use crate::types::Entity;

/// Load up to `pages` pages, then apply the search. Searching narrows what
/// was loaded and never fetches more.
pub async fn load_pages<T, S>(
    controller: &mut ResourceController<T, S>,
    pages: usize,
    search: Option<String>,
) -> anyhow::Result<()>
where
    T: Entity,
    S: PageSource<T> + 'static,
{
    controller.first_page().await?;
    for _ in 1..pages.max(1) {
        if !controller.has_more() {
            break;
        }
        controller.next_page()?.await?;
    }
    if let Some(query) = search {
        controller.set_query(query);
    }
    Ok(())
}
