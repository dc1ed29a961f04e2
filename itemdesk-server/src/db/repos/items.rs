//! Item repository
//!
//! Five statements over `items(id, name)`:
//! - list: newest first, unbounded
//! - get: absence is `None`, not an error
//! - lock: locking read of one row, for read-then-write inside a transaction
//! - insert / update / delete: one statement each, zero rows is not an error

use std::time::Duration;

use sqlx::mysql::MySqlConnection;

use crate::db::error::{bounded, DbError};
use crate::models::Item;

/// Item repository over a borrowed connection
pub struct ItemRepo<'c> {
    conn: &'c mut MySqlConnection,
    timeout: Duration,
}

impl<'c> ItemRepo<'c> {
    /// Wrap a connection. `timeout` bounds each statement.
    ///
    /// Pass `&mut *tx` to run inside a transaction.
    pub fn new(conn: &'c mut MySqlConnection, timeout: Duration) -> Self {
        Self { conn, timeout }
    }

    /// List every item, highest id first.
    pub async fn list_all(&mut self) -> Result<Vec<Item>, DbError> {
        let items = bounded(
            self.timeout,
            sqlx::query_as::<_, Item>("SELECT id, name FROM items ORDER BY id DESC")
                .fetch_all(&mut *self.conn),
        )
        .await?;

        Ok(items)
    }

    /// Get a single item by id.
    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<Item>, DbError> {
        let item = bounded(
            self.timeout,
            sqlx::query_as::<_, Item>("SELECT id, name FROM items WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *self.conn),
        )
        .await?;

        Ok(item)
    }

    /// Lock an item's row until the surrounding transaction ends.
    ///
    /// Returns `false` if no row has `id`. A row deleted by a transaction that
    /// commits while this waits reads as missing.
    pub async fn lock_for_update(&mut self, id: i64) -> Result<bool, DbError> {
        let locked = bounded(
            self.timeout,
            sqlx::query_scalar::<_, i64>("SELECT id FROM items WHERE id = ? FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *self.conn),
        )
        .await?;

        Ok(locked.is_some())
    }

    /// Insert an item, returning the id the database assigned.
    pub async fn insert(&mut self, name: &str) -> Result<i64, DbError> {
        let result = bounded(
            self.timeout,
            sqlx::query("INSERT INTO items (name) VALUES (?)")
                .bind(name)
                .execute(&mut *self.conn),
        )
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    /// Rename an item. Returns rows affected; a missing id affects none.
    pub async fn update(&mut self, id: i64, name: &str) -> Result<u64, DbError> {
        let result = bounded(
            self.timeout,
            sqlx::query("UPDATE items SET name = ? WHERE id = ?")
                .bind(name)
                .bind(id)
                .execute(&mut *self.conn),
        )
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete an item. Returns rows affected; a missing id affects none.
    pub async fn delete(&mut self, id: i64) -> Result<u64, DbError> {
        let result = bounded(
            self.timeout,
            sqlx::query("DELETE FROM items WHERE id = ?")
                .bind(id)
                .execute(&mut *self.conn),
        )
        .await?;

        Ok(result.rows_affected())
    }
}

// Integration tests live in tests/mysql_items.rs and need a running server:
// DB_HOST=... DB_NAME=... cargo test -p itemdesk-server -- --ignored
