//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `AGE_GATE` prefix and
//! nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use age_gate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod auth;
mod database;
mod error;
mod redis;
mod server;
mod session;
mod verification;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use session::SessionConfig;
pub use verification::{
    ProviderEnvironment, VerificationConfig, PRODUCTION_PROVIDER_URL, SANDBOX_PROVIDER_URL,
};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Only the optional backends (`redis`, `database`, `auth`) may be absent;
/// everything else has defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Age verification provider and gate copy
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Visitor session cookie
    #[serde(default)]
    pub session: SessionConfig,

    /// Redis session store; in-memory sessions when absent
    pub redis: Option<RedisConfig>,

    /// PostgreSQL profile store; in-memory profiles when absent
    pub database: Option<DatabaseConfig>,

    /// Customer bearer token validation; anonymous-only when absent
    pub auth: Option<AuthConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `AGE_GATE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `AGE_GATE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `AGE_GATE__VERIFICATION__CLIENT_ID=...` -> `verification.client_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("AGE_GATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Missing provider credentials are deliberately not checked here; see
    /// [`VerificationConfig::validate`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.verification.validate(&self.server.environment)?;
        self.session.validate()?;
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        if let Some(database) = &self.database {
            database.validate()?;
        }
        if let Some(auth) = &self.auth {
            auth.validate()?;
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
