//! Listener and deployment settings.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Upper bound for one request, provider round trips included.
    pub request_timeout_secs: u64,

    /// Public origin of the storefront, e.g. `https://shop.example.com`.
    pub public_base_url: Option<String>,
}

/// Production turns on JSON logs and requires HTTPS for outward URLs.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl ServerConfig {
    /// An unparseable host binds all interfaces.
    pub fn socket_addr(&self) -> SocketAddr {
        let ip = self
            .host
            .parse::<IpAddr>()
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(ip, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Absolute URL of a route on this server, when the public origin is known.
    pub fn public_url(&self, path: &str) -> Option<String> {
        self.public_base_url
            .as_deref()
            .map(|base| format!("{}{}", base.trim_end_matches('/'), path))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        // Must outlive the provider timeout for the callback to finish.
        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout);
        }
        if let Some(base) = &self.public_base_url {
            let parsed =
                url::Url::parse(base).map_err(|_| ValidationError::InvalidUrl("public_base_url"))?;
            if self.is_production() && parsed.scheme() != "https" {
                return Err(ValidationError::MustBeHttps("public_base_url"));
            }
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            log_level: "info,age_gate=debug,sqlx=warn".to_string(),
            request_timeout_secs: 30,
            public_base_url: None,
        }
    }
}
