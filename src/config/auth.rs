//! Customer authentication configuration
//!
//! The storefront issues HS256 bearer tokens to logged-in customers. When
//! this section is absent every request is treated as anonymous and no
//! durable verification record is ever written.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

const MIN_SECRET_LEN: usize = 32;

/// Bearer token validation settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret used by the storefront to sign customer tokens
    pub jwt_secret: SecretString,

    /// Expected `iss` claim, if the storefront sets one
    pub issuer: Option<String>,

    /// Expected `aud` claim, if the storefront sets one
    pub audience: Option<String>,
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH_JWT_SECRET"));
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ValidationError::WeakJwtSecret);
        }
        Ok(())
    }
}
