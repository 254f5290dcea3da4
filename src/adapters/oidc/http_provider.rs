//! HTTP identity provider client.
//!
//! Talks to three fixed endpoints under the configured base URL:
//!
//! | Endpoint | Use |
//! |----------|-----|
//! | `GET {base}/authorize` | browser redirect target |
//! | `POST {base}/token` | authorization code exchange (form encoded) |
//! | `GET {base}/userinfo` | claim retrieval (bearer access token) |
//!
//! Token signatures and discovery documents are not examined; the provider
//! is trusted to have done that before answering.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::config::VerificationConfig;
use crate::domain::verification::{ConfigurationError, ProviderError};
use crate::ports::{IdentityProvider, ProviderSession};

/// Everything needed to talk to the provider on behalf of this storefront.
#[derive(Debug, Clone)]
pub struct OidcClientSettings {
    pub base_url: Url,
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: Url,
    pub scopes: String,
    pub timeout: Duration,
}

impl OidcClientSettings {
    /// Extracts client settings, failing on the first missing credential.
    pub fn from_config(config: &VerificationConfig) -> Result<Self, ConfigurationError> {
        let client_id = config
            .client_id
            .as_ref()
            .filter(|id| !id.trim().is_empty())
            .cloned()
            .ok_or(ConfigurationError::MissingClientId)?;

        let client_secret = config
            .client_secret
            .as_ref()
            .filter(|secret| !secret.expose_secret().is_empty())
            .cloned()
            .ok_or(ConfigurationError::MissingClientSecret)?;

        let redirect_uri = config
            .redirect_uri
            .as_deref()
            .ok_or(ConfigurationError::MissingRedirectUri)?;

        Ok(Self {
            base_url: parse_url("provider_base_url", config.provider_base_url())?,
            client_id,
            client_secret,
            redirect_uri: parse_url("redirect_uri", redirect_uri)?,
            scopes: config.scopes.clone(),
            timeout: config.provider_timeout(),
        })
    }
}

fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigurationError> {
    Url::parse(raw).map_err(|e| ConfigurationError::InvalidUrl {
        field,
        reason: e.to_string(),
    })
}

fn endpoint(base: &Url, path: &str) -> Result<Url, ConfigurationError> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
    parse_url("provider_base_url", &joined)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
}

/// `IdentityProvider` backed by the provider's HTTP API.
pub struct HttpIdentityProvider {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: Url,
    scopes: String,
    authorize_endpoint: Url,
    token_endpoint: Url,
    userinfo_endpoint: Url,
    http: reqwest::Client,
}

impl HttpIdentityProvider {
    pub fn new(settings: OidcClientSettings) -> Result<Self, ConfigurationError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            authorize_endpoint: endpoint(&settings.base_url, "authorize")?,
            token_endpoint: endpoint(&settings.base_url, "token")?,
            userinfo_endpoint: endpoint(&settings.base_url, "userinfo")?,
            client_id: settings.client_id,
            client_secret: settings.client_secret,
            redirect_uri: settings.redirect_uri,
            scopes: settings.scopes,
            http,
        })
    }

    pub fn from_config(config: &VerificationConfig) -> Result<Self, ConfigurationError> {
        Self::new(OidcClientSettings::from_config(config)?)
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::unreachable("request timed out")
    } else {
        ProviderError::unreachable(e.to_string())
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    fn authorization_url(&self, state: &str) -> Url {
        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("scope", &self.scopes)
            .append_pair("state", state);
        url
    }

    async fn authenticate(&self, code: &str, _state: &str) -> Result<ProviderSession, ProviderError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
        ];

        let response = self
            .http
            .post(self.token_endpoint.clone())
            .form(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Provider rejected code exchange");
            return Err(ProviderError::TokenExchangeRejected {
                status: status.as_u16(),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(format!("token response: {}", e)))?;

        Ok(ProviderSession {
            access_token: token.access_token,
            id_token: token.id_token,
        })
    }

    async fn request_user_info(
        &self,
        session: &ProviderSession,
        claim: &str,
    ) -> Result<Option<Value>, ProviderError> {
        let response = self
            .http
            .get(self.userinfo_endpoint.clone())
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::UNAUTHORIZED => {
                return Err(ProviderError::UserInfoRejected { status: 401 });
            }
            status => {
                tracing::warn!(status = status.as_u16(), "Provider rejected userinfo request");
                return Err(ProviderError::UserInfoRejected {
                    status: status.as_u16(),
                });
            }
        }

        let mut claims: Map<String, Value> = response
            .json()
            .await
            .map_err(|e| ProviderError::invalid_response(format!("userinfo response: {}", e)))?;

        Ok(claims.remove(claim))
    }
}

impl std::fmt::Debug for HttpIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityProvider")
            .field("client_id", &self.client_id)
            .field("authorize_endpoint", &self.authorize_endpoint.as_str())
            .finish_non_exhaustive()
    }
}
