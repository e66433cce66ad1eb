//! One service per admin API resource. Each is a thin, cloneable handle over
//! the shared [`Gateway`]; write actions return the [`Mutation`] the caller
//! feeds to its collection.
//!
//! [`Gateway`]: crate::api::Gateway
//! [`Mutation`]: crate::reconcile::Mutation

pub mod analytics_service;
pub mod auth_service;
pub mod category_service;
pub mod log_service;
pub mod post_service;
pub mod task_service;
pub mod user_service;

pub use analytics_service::AnalyticsService;
pub use auth_service::{AuthService, Registered, Registration};
pub use category_service::CategoryService;
pub use log_service::LogService;
pub use post_service::PostService;
pub use task_service::TaskService;
pub use user_service::UserService;

use crate::api::Cursor;

/// `limit` and, when continuing, `startAfter`
pub(crate) fn listing_query(limit: usize, cursor: Option<&Cursor>) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", limit.to_string())];
    if let Some(cursor) = cursor {
        query.push(("startAfter", cursor.as_str().to_string()));
    }
    query
}
