//! Page-level errors with IntoResponse
//!
//! Store failures never reach this type: handlers turn them into notices.
//! What remains are requests that address nothing.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use super::views;

/// Error rendered as a full HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// Unknown path or malformed item id (404)
    NotFound,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, Html(views::not_found())).into_response(),
        }
    }
}
