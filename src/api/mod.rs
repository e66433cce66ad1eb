pub mod envelope;
pub mod gateway;

pub use envelope::{Cursor, ListingKeys, Page};
pub use gateway::{Gateway, LogOnly, LoginBoundary, RawResponse};
