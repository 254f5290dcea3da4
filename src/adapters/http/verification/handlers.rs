//! HTTP handlers for the age verification endpoints.
//!
//! These handlers connect axum routes to the verification command and
//! query handlers. The start and callback routes answer with `302 Found`
//! because they are browser navigations, not API calls.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Json, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::verification::{
    CompleteVerificationCommand, CompleteVerificationHandler, EvaluateCheckoutHandler,
    EvaluateCheckoutQuery, RevokeVerificationCommand,
    RevokeVerificationHandler, StartVerificationCommand, StartVerificationHandler,
};
use crate::application::StatusStore;
use crate::config::VerificationConfig;
use crate::domain::foundation::ValidationError;
use crate::domain::verification::{
    CheckoutDecision, CheckoutGate, RedirectTarget, StoreError, VerificationError,
};
use crate::ports::IdentityProviderFactory;

use super::super::middleware::{OptionalAuth, RequireAuth, VisitorSession};
use super::dto::{
    CallbackParams, CheckoutBlockedResponse, ErrorResponse, NoticeResponse, RevokeResponse,
    StartParams, VerificationStatusResponse,
};
use super::routes::START_PATH;

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the verification routes.
///
/// Cloned per request; handlers are built on demand from it.
#[derive(Clone)]
pub struct VerificationAppState {
    pub status_store: StatusStore,
    pub providers: Arc<dyn IdentityProviderFactory>,
    pub gate: CheckoutGate,
    pub claim: String,
    pub default_return: RedirectTarget,
}

impl VerificationAppState {
    pub fn new(
        status_store: StatusStore,
        providers: Arc<dyn IdentityProviderFactory>,
        config: &VerificationConfig,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            status_store,
            providers,
            gate: CheckoutGate::new(config.messages.clone(), START_PATH),
            claim: config.claim.clone(),
            default_return: RedirectTarget::new(config.checkout_url.clone())?,
        })
    }

    pub fn evaluate_handler(&self) -> EvaluateCheckoutHandler {
        EvaluateCheckoutHandler::new(self.status_store.clone(), self.gate.clone())
    }

    pub fn start_handler(&self) -> StartVerificationHandler {
        StartVerificationHandler::new(
            self.status_store.clone(),
            self.providers.clone(),
            self.default_return.clone(),
        )
    }

    pub fn complete_handler(&self) -> CompleteVerificationHandler {
        CompleteVerificationHandler::new(
            self.status_store.clone(),
            self.providers.clone(),
            self.claim.clone(),
            self.default_return.clone(),
        )
    }

    pub fn revoke_handler(&self) -> RevokeVerificationHandler {
        RevokeVerificationHandler::new(self.status_store.clone())
    }
}

/// `302 Found` to a same-site path or the provider.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

// ════════════════════════════════════════════════════════════════════════════════
// Transitions (browser navigations)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /checkout/age-verification/start - Redirect to the identity provider
pub async fn start_verification(
    State(state): State<VerificationAppState>,
    VisitorSession(visitor): VisitorSession,
    Query(params): Query<StartParams>,
) -> Result<Response, VerificationApiError> {
    let return_to = params
        .return_to
        .and_then(|raw| match RedirectTarget::new(raw) {
            Ok(target) => Some(target),
            Err(e) => {
                tracing::warn!(%visitor, error = %e, "Ignoring unsafe return_to");
                None
            }
        });

    let result = state
        .start_handler()
        .handle(StartVerificationCommand { visitor, return_to })
        .await
        .map_err(|e| VerificationApiError::from(e).with_notices(&state.gate))?;

    Ok(found(result.authorization_url.as_str()))
}

/// GET /checkout/age-verification/callback - Complete verification
///
/// Always ends in a redirect back to checkout. Provider failures, including
/// a query string that cannot be read, are folded into the session status
/// by the command handler; a storage failure is logged and the visitor sent
/// to the default checkout page, where the gate will prompt again.
///
/// The customer, if any, comes from the session binding: this is a browser
/// navigation and carries no bearer token.
pub async fn complete_verification(
    State(state): State<VerificationAppState>,
    VisitorSession(visitor): VisitorSession,
    query: Result<Query<CallbackParams>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::warn!(%visitor, error = %rejection, "Unreadable callback query");
            CallbackParams::unreadable(rejection.body_text())
        }
    };

    let cmd = CompleteVerificationCommand {
        visitor,
        provider_error: params.provider_error(),
        code: params.code,
        state: params.state,
    };

    match state.complete_handler().handle(cmd).await {
        Ok(result) => found(result.redirect_to.as_str()),
        Err(e) => {
            tracing::error!(%visitor, error = %e, "Verification callback could not be recorded");
            found(state.default_return.as_str())
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// API endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /checkout/age-verification - Current status and gate decision
pub async fn get_verification_status(
    State(state): State<VerificationAppState>,
    VisitorSession(visitor): VisitorSession,
    auth: OptionalAuth,
) -> Result<impl IntoResponse, VerificationApiError> {
    let result = state
        .evaluate_handler()
        .handle(EvaluateCheckoutQuery {
            visitor,
            user: auth.user_id(),
        })
        .await?;

    Ok(Json(VerificationStatusResponse::new(
        result.status,
        &result.decision,
    )))
}

/// POST /checkout/finalize - Enforce the gate before an order is placed
///
/// 204 when the purchase may proceed; 403 with the blocking notice otherwise.
pub async fn finalize_checkout(
    State(state): State<VerificationAppState>,
    VisitorSession(visitor): VisitorSession,
    auth: OptionalAuth,
) -> Result<Response, VerificationApiError> {
    let result = state
        .evaluate_handler()
        .handle(EvaluateCheckoutQuery {
            visitor,
            user: auth.user_id(),
        })
        .await?;

    match &result.decision {
        CheckoutDecision::Allow => Ok(StatusCode::NO_CONTENT.into_response()),
        CheckoutDecision::Block(notice) => {
            let body = CheckoutBlockedResponse {
                code: "AGE_VERIFICATION_REQUIRED".to_string(),
                message: notice.message.clone(),
                status: result.status,
                notice: NoticeResponse::from(notice),
            };
            Ok((StatusCode::FORBIDDEN, Json(body)).into_response())
        }
    }
}

/// DELETE /checkout/age-verification - Revoke the customer's verification
pub async fn revoke_verification(
    State(state): State<VerificationAppState>,
    VisitorSession(visitor): VisitorSession,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, VerificationApiError> {
    let result = state
        .revoke_handler()
        .handle(RevokeVerificationCommand {
            visitor,
            user: user.id,
        })
        .await?;

    Ok(Json(RevokeResponse {
        revoked: result.had_record,
    }))
}

/// GET /health - Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts verification errors to HTTP responses.
#[derive(Debug)]
pub struct VerificationApiError {
    error: VerificationError,
    configuration_message: Option<String>,
}

impl VerificationApiError {
    /// Uses the configured operator-facing copy for configuration errors.
    pub fn with_notices(mut self, gate: &CheckoutGate) -> Self {
        self.configuration_message = Some(gate.messages().configuration.clone());
        self
    }

    pub fn error(&self) -> &VerificationError {
        &self.error
    }
}

impl From<VerificationError> for VerificationApiError {
    fn from(error: VerificationError) -> Self {
        Self {
            error,
            configuration_message: None,
        }
    }
}

impl From<StoreError> for VerificationApiError {
    fn from(err: StoreError) -> Self {
        VerificationError::from(err).into()
    }
}

impl IntoResponse for VerificationApiError {
    fn into_response(self) -> Response {
        let code = self.error.code().to_string();
        let (status, message) = match &self.error {
            VerificationError::Configuration(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                self.configuration_message.clone().unwrap_or_else(|| {
                    "Age verification is currently unavailable. Please contact the site operator."
                        .to_string()
                }),
            ),
            VerificationError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            VerificationError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            VerificationError::Provider(_) => (
                StatusCode::BAD_GATEWAY,
                "The identity provider could not be reached".to_string(),
            ),
            VerificationError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.error, %code, "Verification request failed");
        }

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
