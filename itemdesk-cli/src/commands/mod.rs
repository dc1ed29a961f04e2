//! Command implementations for the itemdesk CLI

pub mod serve;

pub use serve::run_serve;
