//! Per-request connection management
//!
//! There is no pool: every request opens its own connection and closes it
//! before responding. Opening is bounded by the configured connect timeout.

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;

use super::error::{bounded, DbError};
use crate::config::DatabaseConfig;

/// Opens single connections from a fixed [`DatabaseConfig`]
#[derive(Clone)]
pub struct ConnectionProvider {
    options: MySqlConnectOptions,
    connect_timeout: Duration,
    query_timeout: Duration,
}

impl ConnectionProvider {
    pub fn new(config: &DatabaseConfig) -> Self {
        Self {
            options: config.connect_options(),
            connect_timeout: config.connect_timeout,
            query_timeout: config.query_timeout,
        }
    }

    /// Open a connection. No retry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Connection`] when the server is unreachable, rejects
    /// the credentials, or does not answer within the connect timeout.
    pub async fn acquire(&self) -> Result<MySqlConnection, DbError> {
        bounded(
            self.connect_timeout,
            MySqlConnection::connect_with(&self.options),
        )
        .await
        .map_err(DbError::Connection)
    }

    /// Close a connection gracefully. Failures are logged, never returned:
    /// the socket is gone either way.
    pub async fn release(&self, conn: MySqlConnection) {
        if let Err(e) = bounded(self.query_timeout, conn.close()).await {
            tracing::debug!(error = %e, "connection close failed");
        }
    }

    /// Upper bound applied to each statement on an acquired connection.
    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }
}
