//! HS256 bearer token validator for storefront customer tokens.
//!
//! The storefront signs a short JWT for each logged-in customer with a
//! shared secret. This adapter implements the `SessionValidator` port by
//! checking that signature and the standard claims:
//!
//! - **Expiry (exp)**: must be in the future
//! - **Issuer (iss)**: must match when an issuer is configured
//! - **Audience (aud)**: must contain ours when an audience is configured
//!
//! # Example
//!
//! ```ignore
//! use age_gate::adapters::auth::JwtSessionValidator;
//!
//! let validator = JwtSessionValidator::from_config(&auth_config);
//! let user = validator.validate("eyJ...").await?;
//! ```

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Claims the storefront places in customer tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerClaims {
    /// Subject - the customer ID
    pub sub: String,

    /// Expiry timestamp (Unix epoch seconds)
    pub exp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `SessionValidator` for HS256-signed customer tokens.
pub struct JwtSessionValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(secret: &[u8], issuer: Option<&str>, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.expose_secret().as_bytes(),
            config.issuer.as_deref(),
            config.audience.as_deref(),
        )
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<CustomerClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                kind => {
                    tracing::debug!(?kind, "Token rejected");
                    AuthError::InvalidToken
                }
            }
        })?;

        let claims = data.claims;
        let id = UserId::new(claims.sub).map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthenticatedUser::new(id, claims.email, claims.name))
    }
}
