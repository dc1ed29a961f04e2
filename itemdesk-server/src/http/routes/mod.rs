//! Route handlers organized by resource

pub mod items;

use axum::response::{IntoResponse, Response};

use super::error::PageError;

/// Fallback for every unmatched path
pub async fn not_found() -> Response {
    PageError::NotFound.into_response()
}
