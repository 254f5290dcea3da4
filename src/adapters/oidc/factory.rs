//! Identity provider factories.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::HttpIdentityProvider;
use crate::config::VerificationConfig;
use crate::domain::verification::ConfigurationError;
use crate::ports::{IdentityProvider, IdentityProviderFactory};

type BuildResult = Result<Arc<dyn IdentityProvider>, ConfigurationError>;

/// Builds the HTTP client from configuration on first use, then reuses it.
///
/// A configuration error is memoized too: configuration cannot change
/// while the process runs.
pub struct OidcProviderFactory {
    config: VerificationConfig,
    built: OnceCell<BuildResult>,
}

impl OidcProviderFactory {
    pub fn new(config: VerificationConfig) -> Self {
        Self {
            config,
            built: OnceCell::new(),
        }
    }
}

impl IdentityProviderFactory for OidcProviderFactory {
    fn provider(&self) -> Result<Arc<dyn IdentityProvider>, ConfigurationError> {
        self.built
            .get_or_init(|| {
                let built = HttpIdentityProvider::from_config(&self.config)
                    .map(|p| Arc::new(p) as Arc<dyn IdentityProvider>);
                match &built {
                    Ok(_) => tracing::info!(
                        base_url = self.config.provider_base_url(),
                        "Identity provider client ready"
                    ),
                    Err(e) => tracing::error!(error = %e, "Identity provider is not configured"),
                }
                built
            })
            .clone()
    }
}

/// Factory that hands out a fixed provider or a fixed configuration error.
///
/// Used in tests and when wiring a custom provider by hand.
pub struct StaticProviderFactory {
    result: BuildResult,
}

impl StaticProviderFactory {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            result: Ok(provider),
        }
    }

    pub fn misconfigured(error: ConfigurationError) -> Self {
        Self { result: Err(error) }
    }
}

impl IdentityProviderFactory for StaticProviderFactory {
    fn provider(&self) -> Result<Arc<dyn IdentityProvider>, ConfigurationError> {
        self.result.clone()
    }
}
