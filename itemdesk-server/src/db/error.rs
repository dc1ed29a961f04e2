//! Database error type

use std::future::Future;
use std::io;
use std::time::Duration;

/// Database error type
///
/// `Connection` means no statement was ever sent. `Query` means a
/// statement, commit or rollback failed on a live connection.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Connection(#[source] sqlx::Error),

    #[error("{0}")]
    Query(#[from] sqlx::Error),
}

impl DbError {
    /// True when the database could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Run a driver future with an upper bound, reporting expiry as a
/// `TimedOut` IO error so it lands in the caller's error variant.
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, sqlx::Error>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(timed_out(limit)),
    }
}

fn timed_out(limit: Duration) -> sqlx::Error {
    sqlx::Error::Io(io::Error::new(
        io::ErrorKind::TimedOut,
        format!("timed out after {}s", limit.as_secs_f32()),
    ))
}
