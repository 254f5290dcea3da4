//! Customer identity middleware and extractors for axum.
//!
//! - `auth_middleware` - validates an optional Bearer token and injects the customer
//! - `RequireAuth` - extractor that requires a logged-in customer
//! - `OptionalAuth` - extractor for routes where a customer is optional
//!
//! The gate works for anonymous visitors too, so a request without a token
//! simply continues without identity. A token that fails validation is
//! rejected rather than silently downgraded to anonymous.
//!
//! ```text
//! Request → auth_middleware → AuthenticatedUser in extensions (if token)
//!                                      ↓
//!                 Handler → OptionalAuth / RequireAuth read from extensions
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

fn error_body(code: &str, message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "code": code,
        "message": message,
    }))
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates a Bearer token if one is present.
///
/// - No token: continue anonymously
/// - Valid token: inject `AuthenticatedUser` and continue
/// - Invalid or expired token: 401
/// - Validator unavailable: 503
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&request) else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(AuthError::TokenExpired) => (
            StatusCode::UNAUTHORIZED,
            error_body("UNAUTHORIZED", "Token expired"),
        )
            .into_response(),
        Err(AuthError::InvalidToken) => (
            StatusCode::UNAUTHORIZED,
            error_body("UNAUTHORIZED", "Invalid token"),
        )
            .into_response(),
        Err(AuthError::ServiceUnavailable(msg)) => {
            tracing::error!("Auth service unavailable: {}", msg);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                error_body("AUTH_UNAVAILABLE", "Authentication service unavailable"),
            )
                .into_response()
        }
    }
}

/// Extractor that requires a logged-in customer.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Extractor for optional customer identity.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

impl OptionalAuth {
    /// The customer's id, if logged in.
    pub fn user_id(&self) -> Option<UserId> {
        self.0.as_ref().map(|u| u.id.clone())
    }
}

impl<S> axum::extract::FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user = parts.extensions.get::<AuthenticatedUser>().cloned();
            Ok(OptionalAuth(user))
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid customer token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                error_body("UNAUTHORIZED", "Authentication required"),
            )
                .into_response(),
        }
    }
}
