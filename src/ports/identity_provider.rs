//! Identity provider port - the external OIDC capability.
//!
//! The gate treats the provider as a black box offering two operations:
//! `authenticate` (redirect out, then exchange the returned code) and
//! `request_user_info` (fetch a single claim). Token validation, discovery
//! and cryptography belong to the provider side and are not modelled here.
//!
//! ```text
//! start:    authorization_url(state) ──302──▶ provider
//! callback: authenticate(code, state) ──▶ ProviderSession
//!           request_user_info(&session, "age_over_18") ──▶ Option<Value>
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::domain::verification::{ConfigurationError, ProviderError};

/// Tokens obtained from a successful code exchange.
#[derive(Clone)]
pub struct ProviderSession {
    pub access_token: String,
    pub id_token: Option<String>,
}

impl std::fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSession")
            .field("access_token", &"[REDACTED]")
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Client for the external identity provider.
///
/// # Contract
///
/// - `authorization_url` never performs I/O
/// - `authenticate` and `request_user_info` return `ProviderError` for every
///   network or protocol failure; they never panic
/// - `request_user_info` returns `Ok(None)` when the claim is absent
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL of the provider's authorization endpoint for this attempt.
    fn authorization_url(&self, state: &str) -> Url;

    /// Exchanges the one-time authorization code for provider tokens.
    async fn authenticate(&self, code: &str, state: &str) -> Result<ProviderSession, ProviderError>;

    /// Fetches a single claim about the authenticated visitor.
    async fn request_user_info(
        &self,
        session: &ProviderSession,
        claim: &str,
    ) -> Result<Option<Value>, ProviderError>;
}

/// Builds the identity provider client from static configuration.
///
/// Implementations memoize: configuration does not vary per request, so the
/// client (or the configuration error) is produced once.
pub trait IdentityProviderFactory: Send + Sync {
    fn provider(&self) -> Result<Arc<dyn IdentityProvider>, ConfigurationError>;
}
