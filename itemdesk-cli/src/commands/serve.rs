//! HTTP server command
//!
//! Runs the item pages against a MySQL/MariaDB database. Every flag falls
//! back to an environment variable, read after `.env` is loaded.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use itemdesk_server::db::{ConnectionProvider, MySqlItemStore};
use itemdesk_server::{run_server, DatabaseConfig, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "ITEMDESK_BIND", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = 3306)]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "root")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub db_password: String,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "itemdesk")]
    pub db_name: String,

    /// Seconds to wait for a database connection
    #[arg(long, env = "DB_CONNECT_TIMEOUT", default_value_t = 5)]
    pub connect_timeout: u64,

    /// Seconds to wait for a single statement
    #[arg(long, env = "DB_QUERY_TIMEOUT", default_value_t = 10)]
    pub query_timeout: u64,

    /// Key signing the notice cookie (random per process if unset)
    #[arg(long, env = "ITEMDESK_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,
}

impl ServeArgs {
    fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout),
            query_timeout: Duration::from_secs(self.query_timeout),
        }
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            secret_key: self.secret_key.clone().filter(|key| !key.is_empty()),
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let db_config = args.database_config();
    tracing::info!(
        host = %db_config.host,
        port = db_config.port,
        database = %db_config.database,
        "Starting itemdesk server on {}",
        args.bind
    );

    // No connection is opened here: each request opens its own, so an
    // unreachable database shows up as notices rather than a failed start.
    let store = MySqlItemStore::new(ConnectionProvider::new(&db_config));

    run_server(Arc::new(store), args.server_config())
        .await
        .context("Server error")?;

    Ok(())
}
