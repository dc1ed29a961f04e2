//! itemdesk-server: HTTP server for a table of named items
//!
//! Lists, adds, edits and deletes rows of a single `items` table in
//! MySQL/MariaDB, rendering HTML pages and carrying one-shot notices
//! across redirects in a signed cookie.

pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{DatabaseConfig, ServerConfig};
pub use http::{build_router, run_server, AppState, ServerError};
