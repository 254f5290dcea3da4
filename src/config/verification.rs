//! Age verification provider configuration
//!
//! Credentials are optional at load time. A storefront can boot without
//! them; the start and callback routes then report a configuration error
//! instead of the whole process refusing to start.

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::verification::claim::AGE_OVER_18_CLAIM;
use crate::domain::verification::NoticeMessages;

/// Base URL of the provider's sandbox tenant.
pub const SANDBOX_PROVIDER_URL: &str = "https://sandbox.ageverify.example.com/oidc";

/// Base URL of the provider's production tenant.
pub const PRODUCTION_PROVIDER_URL: &str = "https://ageverify.example.com/oidc";

/// Which provider tenant to talk to
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl ProviderEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_PROVIDER_URL,
            Self::Production => PRODUCTION_PROVIDER_URL,
        }
    }
}

/// Age verification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    /// Provider tenant
    #[serde(default)]
    pub provider_environment: ProviderEnvironment,

    /// Overrides the tenant's base URL (self-hosted or test providers)
    pub provider_base_url: Option<String>,

    /// OIDC client identifier
    pub client_id: Option<String>,

    /// OIDC client secret
    pub client_secret: Option<SecretString>,

    /// Callback URL registered with the provider
    pub redirect_uri: Option<String>,

    /// Where visitors are returned when no other location is recorded
    #[serde(default = "default_checkout_url")]
    pub checkout_url: String,

    /// Name of the claim requested from the provider
    #[serde(default = "default_claim")]
    pub claim: String,

    /// Space-separated OIDC scopes
    #[serde(default = "default_scopes")]
    pub scopes: String,

    /// Timeout for each request to the provider, in seconds
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    /// Notice copy shown by the checkout gate
    #[serde(default)]
    pub messages: NoticeMessages,
}

impl VerificationConfig {
    /// Base URL the provider client talks to.
    pub fn provider_base_url(&self) -> &str {
        self.provider_base_url
            .as_deref()
            .unwrap_or_else(|| self.provider_environment.base_url())
    }

    /// Get provider timeout as Duration
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// True when both credentials are present.
    pub fn has_credentials(&self) -> bool {
        self.client_id.as_deref().is_some_and(|id| !id.is_empty()) && self.client_secret.is_some()
    }

    /// Validate the parts that are required regardless of credentials.
    ///
    /// Missing credentials are not a validation failure here.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if !self.checkout_url.starts_with('/') || self.checkout_url.starts_with("//") {
            return Err(ValidationError::InvalidCheckoutUrl);
        }
        if self.claim.trim().is_empty() {
            return Err(ValidationError::MissingRequired("VERIFICATION_CLAIM"));
        }
        if self.provider_timeout_secs == 0 || self.provider_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }

        let base = url::Url::parse(self.provider_base_url())
            .map_err(|_| ValidationError::InvalidUrl("provider_base_url"))?;
        if *environment == Environment::Production && base.scheme() != "https" {
            return Err(ValidationError::MustBeHttps("provider_base_url"));
        }

        if let Some(redirect) = &self.redirect_uri {
            url::Url::parse(redirect).map_err(|_| ValidationError::InvalidUrl("redirect_uri"))?;
        }
        Ok(())
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            provider_environment: ProviderEnvironment::default(),
            provider_base_url: None,
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            checkout_url: default_checkout_url(),
            claim: default_claim(),
            scopes: default_scopes(),
            provider_timeout_secs: default_provider_timeout(),
            messages: NoticeMessages::default(),
        }
    }
}

fn default_checkout_url() -> String {
    "/checkout".to_string()
}

fn default_claim() -> String {
    AGE_OVER_18_CLAIM.to_string()
}

fn default_scopes() -> String {
    "openid".to_string()
}

fn default_provider_timeout() -> u64 {
    10
}
