//! Server and database configuration
//!
//! Values normally come from `itemdesk serve` flags. [`DatabaseConfig::from_env`]
//! reads the same environment variables the flags fall back to:
//! - `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`
//! - `DB_CONNECT_TIMEOUT`, `DB_QUERY_TIMEOUT` (seconds)

use std::net::SocketAddr;
use std::time::Duration;

use sqlx::mysql::MySqlConnectOptions;

/// Connection settings for the items database
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,

    /// Upper bound on opening a connection
    pub connect_timeout: Duration,

    /// Upper bound on a single statement, commit or rollback
    pub query_timeout: Duration,
}

impl DatabaseConfig {
    /// Create config from environment variables, using defaults for unset ones
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |key: &str| std::env::var(key).ok();
        let secs = |key: &str, fallback: Duration| {
            var(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        Self {
            host: var("DB_HOST").unwrap_or(defaults.host),
            port: var("DB_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            user: var("DB_USER").unwrap_or(defaults.user),
            password: var("DB_PASSWORD").unwrap_or(defaults.password),
            database: var("DB_NAME").unwrap_or(defaults.database),
            connect_timeout: secs("DB_CONNECT_TIMEOUT", defaults.connect_timeout),
            query_timeout: secs("DB_QUERY_TIMEOUT", defaults.query_timeout),
        }
    }

    /// Driver options for a single connection
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            database: "itemdesk".to_string(),
            connect_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(10),
        }
    }
}

// Hand-written so the password never reaches the logs.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:5000)
    pub bind_addr: SocketAddr,

    /// Key used to sign the notice cookie.
    ///
    /// `None` generates a random key at startup, so notices pending
    /// across a restart are dropped.
    pub secret_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            secret_key: None,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
