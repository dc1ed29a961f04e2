//! HTTP server layer
//!
//! Axum server with:
//! - HTML pages for the item list and forms
//! - One-shot notices in a signed cookie
//! - Request tracing
//! - Graceful shutdown

pub mod error;
pub mod extractors;
pub mod flash;
pub mod routes;
pub mod server;
pub mod views;

pub use error::PageError;
pub use flash::{Flash, FlashKey, Level, Notice};
pub use server::{build_router, run_server, AppState, ServerError};
