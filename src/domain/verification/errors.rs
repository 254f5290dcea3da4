//! Verification error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Configuration | 503 |
//! | Provider | never surfaced, mapped to `VerificationStatus::Error` |
//! | Store | 500 |
//! | Validation | 400 |
//! | Unauthenticated | 401 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// The identity provider client cannot be built from configuration.
///
/// Fatal to the start transition; the visitor is told to contact the site
/// operator and is not offered a retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Provider client ID is not configured")]
    MissingClientId,

    #[error("Provider client secret is not configured")]
    MissingClientSecret,

    #[error("Provider redirect URI is not configured")]
    MissingRedirectUri,

    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("HTTP client could not be built: {0}")]
    HttpClient(String),
}

/// Failure while talking to the identity provider during the callback.
///
/// Always recovered at the callback boundary by recording
/// `VerificationStatus::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Token exchange rejected with status {status}")]
    TokenExchangeRejected { status: u16 },

    #[error("Userinfo request rejected with status {status}")]
    UserInfoRejected { status: u16 },

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider returned an error: {0}")]
    Returned(String),

    #[error("Callback carried no authorization code")]
    MissingCode,

    #[error("Callback state does not match the pending authorization")]
    StateMismatch,
}

impl ProviderError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

/// Failure in the session or profile key-value backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Session store unavailable: {0}")]
    SessionUnavailable(String),

    #[error("Profile store unavailable: {0}")]
    ProfileUnavailable(String),

    #[error("Corrupt value under '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

impl StoreError {
    pub fn session(message: impl Into<String>) -> Self {
        Self::SessionUnavailable(message.into())
    }

    pub fn profile(message: impl Into<String>) -> Self {
        Self::ProfileUnavailable(message.into())
    }

    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by the verification application handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("An authenticated customer is required")]
    Unauthenticated,
}

impl VerificationError {
    /// Returns the domain error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            VerificationError::Configuration(_) => ErrorCode::ConfigurationError,
            VerificationError::Provider(_) => ErrorCode::ProviderError,
            VerificationError::Store(StoreError::SessionUnavailable(_)) => {
                ErrorCode::SessionStoreError
            }
            VerificationError::Store(StoreError::ProfileUnavailable(_)) => {
                ErrorCode::ProfileStoreError
            }
            VerificationError::Store(StoreError::Corrupt { .. }) => ErrorCode::InternalError,
            VerificationError::Validation(_) => ErrorCode::ValidationFailed,
            VerificationError::Unauthenticated => ErrorCode::Unauthorized,
        }
    }
}

impl From<VerificationError> for DomainError {
    fn from(err: VerificationError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
