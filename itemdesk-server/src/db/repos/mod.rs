//! Repository implementations for database access
//!
//! Repositories borrow a live connection (or transaction) from the caller
//! and never open, commit or close anything themselves.

pub mod items;

pub use items::ItemRepo;
