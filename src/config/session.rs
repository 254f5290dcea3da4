//! Visitor session cookie configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Visitor session settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the visitor session id
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Idle lifetime of a session in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Mark the cookie `Secure` (HTTPS only)
    #[serde(default)]
    pub secure: bool,
}

impl SessionConfig {
    /// Get session lifetime as Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let name_ok = !self.cookie_name.is_empty()
            && self
                .cookie_name
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !name_ok {
            return Err(ValidationError::InvalidCookieName);
        }
        if self.ttl_secs == 0 {
            return Err(ValidationError::InvalidSessionTtl);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_ttl(),
            secure: false,
        }
    }
}

fn default_cookie_name() -> String {
    "age_gate_sid".to_string()
}

fn default_ttl() -> u64 {
    86_400
}
