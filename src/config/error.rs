//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Database pool needs at least one connection")]
    InvalidPoolSize,

    #[error("{0} must use HTTPS in production")]
    MustBeHttps(&'static str),

    #[error("Checkout URL must be a same-site path starting with '/'")]
    InvalidCheckoutUrl,

    #[error("Session cookie name is invalid")]
    InvalidCookieName,

    #[error("Session TTL must be greater than zero")]
    InvalidSessionTtl,

    #[error("JWT secret must be at least 32 bytes")]
    WeakJwtSecret,
}
