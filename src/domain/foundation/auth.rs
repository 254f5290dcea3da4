//! Storefront customer identity types.
//!
//! The age gate does not own customer login. The storefront issues bearer
//! tokens for logged-in customers; the `SessionValidator` port turns such a
//! token into an `AuthenticatedUser`. Anonymous visitors simply carry no
//! identity, and only ever get session-tier verification.

use super::UserId;
use thiserror::Error;

/// Customer identity extracted from a validated storefront token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique customer identifier (the durable-store key).
    pub id: UserId,

    /// Email address, if the token carried one.
    pub email: Option<String>,

    /// Display name, if the token carried one.
    pub display_name: Option<String>,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, email: Option<String>, display_name: Option<String>) -> Self {
        Self {
            id,
            email,
            display_name,
        }
    }

    /// Creates a user carrying only an identifier.
    pub fn from_id(id: UserId) -> Self {
        Self::new(id, None, None)
    }
}

/// Errors that can occur during storefront token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// Token validation could not be performed (missing key material, etc.).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if the client should obtain a fresh token.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
