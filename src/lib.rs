pub mod api;
pub mod cli;
pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod reconcile;
pub mod services;
pub mod session;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use client::AdminClient;
pub use error::{ClientError, Result};
