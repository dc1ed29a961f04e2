//! Database layer - connection provider, repository and stores
//!
//! # Design Principles
//!
//! - One connection per request, closed on every exit path - no pool
//! - Every value goes through parameter binding - no SQL built from input
//! - One write statement per transaction, rolled back explicitly on failure
//! - Rows are mapped to [`Item`](crate::models::Item) at the repository edge

pub mod connection;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod repos;
pub mod store;

pub use connection::ConnectionProvider;
pub use error::DbError;
#[cfg(test)]
pub use memory::MemoryItemStore;
pub use repos::ItemRepo;
pub use store::{ItemStore, MySqlItemStore};
