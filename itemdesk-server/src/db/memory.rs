//! In-memory item store
//!
//! Same contract as the MySQL store, backed by a `BTreeMap`. Used by router
//! tests, including stores that simulate an unreachable database or failing
//! statements.

use std::collections::BTreeMap;
use std::io;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::DbError;
use super::store::ItemStore;
use crate::models::{Item, ItemName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Online,
    Unreachable,
    FailingQueries,
}

#[derive(Debug, Default)]
struct Rows {
    items: BTreeMap<i64, String>,
    last_id: i64,
}

/// In-memory store with auto-increment ids
#[derive(Debug)]
pub struct MemoryItemStore {
    rows: Mutex<Rows>,
    mode: Mode,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::with_mode(Mode::Online)
    }

    /// A store whose every call fails as if the database were down.
    pub fn unreachable() -> Self {
        Self::with_mode(Mode::Unreachable)
    }

    /// A store that connects but fails every statement.
    pub fn failing_queries() -> Self {
        Self::with_mode(Mode::FailingQueries)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            rows: Mutex::new(Rows::default()),
            mode,
        }
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check(&self) -> Result<(), DbError> {
        match self.mode {
            Mode::Online => Ok(()),
            Mode::Unreachable => Err(DbError::Connection(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))),
            Mode::FailingQueries => Err(DbError::Query(sqlx::Error::Protocol(
                "statement rejected".to_string(),
            ))),
        }
    }
}

impl Default for MemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn list(&self) -> Result<Vec<Item>, DbError> {
        self.check()?;
        let rows = self.rows.lock().await;
        Ok(rows
            .items
            .iter()
            .rev()
            .map(|(id, name)| Item {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Item>, DbError> {
        self.check()?;
        let rows = self.rows.lock().await;
        Ok(rows.items.get(&id).map(|name| Item {
            id,
            name: name.clone(),
        }))
    }

    async fn insert(&self, name: &ItemName) -> Result<i64, DbError> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        rows.last_id += 1;
        let id = rows.last_id;
        rows.items.insert(id, name.as_str().to_owned());
        Ok(id)
    }

    async fn update(&self, id: i64, name: &ItemName) -> Result<bool, DbError> {
        self.check()?;
        let mut rows = self.rows.lock().await;
        match rows.items.get_mut(&id) {
            Some(existing) => {
                *existing = name.as_str().to_owned();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        self.check()?;
        self.rows.lock().await.items.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn name(s: &str) -> ItemName {
        ItemName::new(s).unwrap()
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = MemoryItemStore::new();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn newest_item_is_listed_first() {
        let store = MemoryItemStore::new();
        store.insert(&name("first")).await.unwrap();
        let id = store.insert(&name("second")).await.unwrap();

        let items = store.list().await.unwrap();
        assert_eq!(items[0], Item { id, name: "second".into() });
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn update_and_delete_missing_ids_are_noops() {
        let store = MemoryItemStore::new();
        store.insert(&name("kept")).await.unwrap();

        assert!(!store.update(99, &name("ghost")).await.unwrap());
        store.delete(99).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryItemStore::new();
        let first = store.insert(&name("a")).await.unwrap();
        store.delete(first).await.unwrap();
        let second = store.insert(&name("b")).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn concurrent_inserts_get_distinct_ids() {
        let store = Arc::new(MemoryItemStore::new());
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(&name(&format!("item-{i}"))).await.unwrap() })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("task panicked"));
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[tokio::test]
    async fn failure_modes_map_to_error_kinds() {
        let err = MemoryItemStore::unreachable().list().await.unwrap_err();
        assert!(err.is_connection());

        let err = MemoryItemStore::failing_queries()
            .insert(&name("x"))
            .await
            .unwrap_err();
        assert!(!err.is_connection());
    }
}
