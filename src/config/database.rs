//! Durable profile tier in PostgreSQL.
//!
//! Without this section verification records for logged-in customers live
//! in memory and are lost on restart.

use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL.
    pub url: String,

    /// The gate does one or two small queries per request.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Apply `migrations/` at startup.
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Opens a lazily-connecting pool; the first query establishes connections.
    pub fn connect_lazy(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .connect_lazy(&self.url)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = url::Url::parse(&self.url).map_err(|_| ValidationError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 {
            return Err(ValidationError::InvalidPoolSize);
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout() -> u64 {
    3
}
