//! Item stores - the per-request lifecycle handlers depend on
//!
//! [`MySqlItemStore`] wraps each operation in
//! acquire → (begin) → repository call → commit or rollback → close,
//! releasing the connection on every exit path.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlConnection};
use sqlx::{Connection, Transaction};

use super::connection::ConnectionProvider;
use super::error::{bounded, DbError};
use super::repos::ItemRepo;
use crate::models::{Item, ItemName};

/// Item operations as seen by request handlers
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items, highest id first.
    async fn list(&self) -> Result<Vec<Item>, DbError>;

    /// One item, or `None` if no row has `id`.
    async fn get(&self, id: i64) -> Result<Option<Item>, DbError>;

    /// Insert an item and return its new id.
    async fn insert(&self, name: &ItemName) -> Result<i64, DbError>;

    /// Rename an item. Returns `false`, without writing, if no row has `id`.
    async fn update(&self, id: i64, name: &ItemName) -> Result<bool, DbError>;

    /// Delete an item. A missing id is a no-op.
    async fn delete(&self, id: i64) -> Result<(), DbError>;
}

/// MySQL/MariaDB-backed store, one connection per call
#[derive(Clone)]
pub struct MySqlItemStore {
    provider: ConnectionProvider,
}

impl MySqlItemStore {
    pub fn new(provider: ConnectionProvider) -> Self {
        Self { provider }
    }

    fn timeout(&self) -> Duration {
        self.provider.query_timeout()
    }

    async fn begin<'c>(
        &self,
        conn: &'c mut MySqlConnection,
    ) -> Result<Transaction<'c, MySql>, DbError> {
        Ok(bounded(self.timeout(), conn.begin()).await?)
    }

    async fn commit(&self, tx: Transaction<'_, MySql>) -> Result<(), DbError> {
        Ok(bounded(self.timeout(), tx.commit()).await?)
    }

    async fn rollback(&self, tx: Transaction<'_, MySql>) {
        if let Err(e) = bounded(self.timeout(), tx.rollback()).await {
            tracing::warn!(error = %e, "rollback failed");
        }
    }

    async fn insert_on(&self, conn: &mut MySqlConnection, name: &ItemName) -> Result<i64, DbError> {
        let mut tx = self.begin(conn).await?;
        match ItemRepo::new(&mut *tx, self.timeout()).insert(name.as_str()).await {
            Ok(id) => {
                self.commit(tx).await?;
                Ok(id)
            }
            Err(e) => {
                self.rollback(tx).await;
                Err(e)
            }
        }
    }

    async fn update_on(
        &self,
        conn: &mut MySqlConnection,
        id: i64,
        name: &ItemName,
    ) -> Result<bool, DbError> {
        let mut tx = self.begin(conn).await?;
        let result = {
            let mut repo = ItemRepo::new(&mut *tx, self.timeout());
            match repo.lock_for_update(id).await {
                Ok(true) => repo.update(id, name.as_str()).await.map(|_| true),
                Ok(false) => Ok(false),
                Err(e) => Err(e),
            }
        };

        match result {
            Ok(true) => {
                self.commit(tx).await?;
                Ok(true)
            }
            Ok(false) => {
                self.rollback(tx).await;
                Ok(false)
            }
            Err(e) => {
                self.rollback(tx).await;
                Err(e)
            }
        }
    }

    async fn delete_on(&self, conn: &mut MySqlConnection, id: i64) -> Result<(), DbError> {
        let mut tx = self.begin(conn).await?;
        match ItemRepo::new(&mut *tx, self.timeout()).delete(id).await {
            Ok(affected) => {
                self.commit(tx).await?;
                tracing::debug!(item_id = id, affected, "delete committed");
                Ok(())
            }
            Err(e) => {
                self.rollback(tx).await;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl ItemStore for MySqlItemStore {
    async fn list(&self) -> Result<Vec<Item>, DbError> {
        let mut conn = self.provider.acquire().await?;
        let result = ItemRepo::new(&mut conn, self.timeout()).list_all().await;
        self.provider.release(conn).await;
        result
    }

    async fn get(&self, id: i64) -> Result<Option<Item>, DbError> {
        let mut conn = self.provider.acquire().await?;
        let result = ItemRepo::new(&mut conn, self.timeout()).get_by_id(id).await;
        self.provider.release(conn).await;
        result
    }

    async fn insert(&self, name: &ItemName) -> Result<i64, DbError> {
        let mut conn = self.provider.acquire().await?;
        let result = self.insert_on(&mut conn, name).await;
        self.provider.release(conn).await;
        result
    }

    async fn update(&self, id: i64, name: &ItemName) -> Result<bool, DbError> {
        let mut conn = self.provider.acquire().await?;
        let result = self.update_on(&mut conn, id, name).await;
        self.provider.release(conn).await;
        result
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut conn = self.provider.acquire().await?;
        let result = self.delete_on(&mut conn, id).await;
        self.provider.release(conn).await;
        result
    }
}
