//! Item pages and form endpoints
//!
//! Store failures never surface as error statuses: each becomes an error
//! notice on the list page (or on a redirect to it).

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::db::DbError;
use crate::http::extractors::ItemId;
use crate::http::flash::{Flash, Notice};
use crate::http::server::AppState;
use crate::http::views;
use crate::models::ItemName;

const NAME_REQUIRED: &str = "Name is required!";
const ITEM_NOT_FOUND: &str = "Item not found!";

/// Submitted add/edit form. A missing field reads as empty.
#[derive(Debug, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub name: String,
}

/// Notice for a failed store call. `action` completes "Error ..." for
/// failures after the connection was established.
fn failure_notice(action: &str, err: &DbError) -> Notice {
    match err {
        DbError::Connection(e) => Notice::error(format!("Database connection error: {}", e)),
        DbError::Query(e) => Notice::error(format!("Error {}: {}", action, e)),
    }
}

/// GET / - list all items, newest first
async fn list_items(State(state): State<Arc<AppState>>, flash: Flash) -> Response {
    match state.store.list().await {
        Ok(items) => flash.render(StatusCode::OK, vec![], |notices| {
            views::index(&items, notices)
        }),
        Err(e) => {
            error!(error = %e, "failed to list items");
            flash.render(
                StatusCode::OK,
                vec![failure_notice("retrieving items", &e)],
                |notices| views::index(&[], notices),
            )
        }
    }
}

/// GET /add - empty item form
async fn add_form(flash: Flash) -> Response {
    flash.render(StatusCode::OK, vec![], views::add_form)
}

/// POST /add - insert a new item
async fn add_item(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    Form(form): Form<ItemForm>,
) -> Response {
    let Ok(name) = ItemName::new(&form.name) else {
        return flash.redirect("/add", vec![Notice::error(NAME_REQUIRED)]);
    };

    match state.store.insert(&name).await {
        Ok(id) => {
            info!(item_id = id, "item added");
            flash.redirect(
                "/",
                vec![Notice::success(format!("Item \"{}\" added successfully!", name))],
            )
        }
        Err(e) => {
            error!(error = %e, "failed to add item");
            flash.redirect("/", vec![failure_notice("adding item", &e)])
        }
    }
}

/// GET /edit/{id} - form pre-filled with the stored item
async fn edit_form(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    ItemId(id): ItemId,
) -> Response {
    match state.store.get(id).await {
        Ok(Some(item)) => flash.render(StatusCode::OK, vec![], |notices| {
            views::edit_form(&item, notices)
        }),
        Ok(None) => flash.redirect("/", vec![Notice::error(ITEM_NOT_FOUND)]),
        Err(e) => {
            error!(item_id = id, error = %e, "failed to load item for edit");
            flash.redirect("/", vec![failure_notice("retrieving item for edit", &e)])
        }
    }
}

/// POST /edit/{id} - rename an item
///
/// An empty name re-renders the form with the stored item. Otherwise the
/// store checks existence and updates on one connection.
async fn edit_item(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    ItemId(id): ItemId,
    Form(form): Form<ItemForm>,
) -> Response {
    let Ok(name) = ItemName::new(&form.name) else {
        return match state.store.get(id).await {
            Ok(Some(item)) => flash.render(
                StatusCode::OK,
                vec![Notice::error(NAME_REQUIRED)],
                |notices| views::edit_form(&item, notices),
            ),
            Ok(None) => flash.redirect("/", vec![Notice::error(ITEM_NOT_FOUND)]),
            Err(e) => {
                error!(item_id = id, error = %e, "failed to load item for edit");
                flash.redirect("/", vec![failure_notice("retrieving item for edit", &e)])
            }
        };
    };

    match state.store.update(id, &name).await {
        Ok(true) => {
            info!(item_id = id, "item updated");
            flash.redirect(
                "/",
                vec![Notice::success(format!("Item \"{}\" updated successfully!", name))],
            )
        }
        Ok(false) => flash.redirect("/", vec![Notice::error(ITEM_NOT_FOUND)]),
        Err(e) => {
            error!(item_id = id, error = %e, "failed to update item");
            flash.redirect("/", vec![failure_notice("updating item", &e)])
        }
    }
}

/// POST /delete/{id} - delete an item (missing ids are a no-op)
async fn delete_item(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    ItemId(id): ItemId,
) -> Response {
    match state.store.delete(id).await {
        Ok(()) => {
            info!(item_id = id, "item deleted");
            flash.redirect("/", vec![Notice::success("Item deleted successfully!")])
        }
        Err(e) => {
            error!(item_id = id, error = %e, "failed to delete item");
            flash.redirect("/", vec![failure_notice("deleting item", &e)])
        }
    }
}

/// Item routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_items))
        .route("/add", get(add_form).post(add_item))
        .route("/edit/{id}", get(edit_form).post(edit_item))
        .route("/delete/{id}", post(delete_item))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failures_name_the_database() {
        let err = DbError::Connection(sqlx::Error::Protocol("refused".into()));
        let notice = failure_notice("adding item", &err);
        assert!(notice.message.starts_with("Database connection error: "));
        assert!(notice.message.contains("refused"));
    }

    #[test]
    fn query_failures_name_the_action() {
        let err = DbError::Query(sqlx::Error::Protocol("duplicate".into()));
        let notice = failure_notice("adding item", &err);
        assert!(notice.message.starts_with("Error adding item: "));
        assert!(notice.message.contains("duplicate"));
    }
}
