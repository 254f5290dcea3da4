//! Mock identity provider for testing.
//!
//! Scripted outcomes for the code exchange and the claim lookup, plus call
//! recording so tests can assert on what the gate asked for.
//!
//! # Example
//!
//! ```ignore
//! use age_gate::adapters::oidc::{MockIdentityProvider, StaticProviderFactory};
//!
//! let provider = Arc::new(MockIdentityProvider::affirming());
//! let factory = StaticProviderFactory::new(provider.clone());
//! // ... drive the callback ...
//! assert_eq!(provider.exchange_calls(), 1);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::domain::verification::ProviderError;
use crate::ports::{IdentityProvider, ProviderSession};

/// Authorization endpoint the mock redirects to.
pub const MOCK_AUTHORIZE_URL: &str = "https://idp.mock.test/authorize";

/// Mock identity provider.
#[derive(Debug)]
pub struct MockIdentityProvider {
    exchange: Result<(), ProviderError>,
    user_info: Result<Option<Value>, ProviderError>,
    exchange_calls: AtomicUsize,
    requested_claims: Mutex<Vec<String>>,
    codes: Mutex<Vec<String>>,
}

impl MockIdentityProvider {
    fn scripted(exchange: Result<(), ProviderError>, user_info: Result<Option<Value>, ProviderError>) -> Self {
        Self {
            exchange,
            user_info,
            exchange_calls: AtomicUsize::new(0),
            requested_claims: Mutex::new(Vec::new()),
            codes: Mutex::new(Vec::new()),
        }
    }

    /// Provider that answers the claim with any JSON value.
    pub fn with_claim(value: Value) -> Self {
        Self::scripted(Ok(()), Ok(Some(value)))
    }

    /// Provider that confirms the visitor is over age.
    pub fn affirming() -> Self {
        Self::with_claim(Value::Bool(true))
    }

    /// Provider that reports the visitor as under age.
    pub fn denying() -> Self {
        Self::with_claim(Value::Bool(false))
    }

    /// Provider whose userinfo response lacks the claim entirely.
    pub fn without_claim() -> Self {
        Self::scripted(Ok(()), Ok(None))
    }

    /// Provider whose code exchange fails.
    pub fn failing_exchange(error: ProviderError) -> Self {
        Self::scripted(Err(error), Ok(None))
    }

    /// Provider whose code exchange succeeds but whose userinfo call fails.
    pub fn failing_user_info(error: ProviderError) -> Self {
        Self::scripted(Ok(()), Err(error))
    }

    /// Number of code exchanges attempted.
    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    /// Claim names requested, in call order.
    pub fn requested_claims(&self) -> Vec<String> {
        self.requested_claims
            .lock()
            .map(|claims| claims.clone())
            .unwrap_or_default()
    }

    /// Authorization codes presented for exchange, in call order.
    pub fn exchanged_codes(&self) -> Vec<String> {
        self.codes
            .lock()
            .map(|codes| codes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn authorization_url(&self, state: &str) -> Url {
        let mut url = Url::parse(MOCK_AUTHORIZE_URL).expect("mock authorize URL is valid");
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("state", state);
        url
    }

    async fn authenticate(&self, code: &str, _state: &str) -> Result<ProviderSession, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut codes) = self.codes.lock() {
            codes.push(code.to_string());
        }
        self.exchange.clone()?;
        Ok(ProviderSession {
            access_token: format!("mock-access-{}", code),
            id_token: None,
        })
    }

    async fn request_user_info(
        &self,
        _session: &ProviderSession,
        claim: &str,
    ) -> Result<Option<Value>, ProviderError> {
        if let Ok(mut claims) = self.requested_claims.lock() {
            claims.push(claim.to_string());
        }
        self.user_info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> ProviderSession {
        ProviderSession {
            access_token: "t".to_string(),
            id_token: None,
        }
    }

    #[test]
    fn authorization_url_echoes_state() {
        let url = MockIdentityProvider::affirming().authorization_url("xyz");
        assert!(url.query_pairs().any(|(k, v)| k == "state" && v == "xyz"));
    }

    #[tokio::test]
    async fn affirming_provider_answers_true() {
        let provider = MockIdentityProvider::affirming();
        let session = provider.authenticate("c", "s").await.unwrap();

        let value = provider.request_user_info(&session, "age_over_18").await.unwrap();

        assert_eq!(value, Some(json!(true)));
        assert_eq!(provider.exchange_calls(), 1);
        assert_eq!(provider.exchanged_codes(), vec!["c".to_string()]);
        assert_eq!(provider.requested_claims(), vec!["age_over_18".to_string()]);
    }

    #[tokio::test]
    async fn failing_exchange_still_counts_the_call() {
        let provider = MockIdentityProvider::failing_exchange(ProviderError::unreachable("down"));

        let result = provider.authenticate("c", "s").await;

        assert!(matches!(result, Err(ProviderError::Unreachable(_))));
        assert_eq!(provider.exchange_calls(), 1);
    }

    #[tokio::test]
    async fn without_claim_returns_none() {
        let provider = MockIdentityProvider::without_claim();
        assert_eq!(
            provider.request_user_info(&session(), "age_over_18").await.unwrap(),
            None
        );
    }
}
