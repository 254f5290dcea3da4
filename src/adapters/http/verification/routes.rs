//! Axum router configuration for the age verification endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    complete_verification, finalize_checkout, get_verification_status, revoke_verification,
    start_verification, VerificationAppState,
};

pub const VERIFICATION_PATH: &str = "/checkout/age-verification";
pub const START_PATH: &str = "/checkout/age-verification/start";
pub const CALLBACK_PATH: &str = "/checkout/age-verification/callback";
pub const FINALIZE_PATH: &str = "/checkout/finalize";

/// Browser navigations of the verification flow (302).
///
/// - `GET /checkout/age-verification/start[?return_to=/path]` - redirect to the provider
/// - `GET /checkout/age-verification/callback?code&state` - provider returns here
///
/// Browsers send no bearer token on these, so they are mounted outside the
/// customer identity middleware.
pub fn flow_routes() -> Router<VerificationAppState> {
    Router::new()
        .route(START_PATH, get(start_verification))
        .route(CALLBACK_PATH, get(complete_verification))
}

/// Storefront API for the gate.
///
/// - `GET /checkout/age-verification` - status, decision and notice
/// - `DELETE /checkout/age-verification` - revoke (customer required)
/// - `POST /checkout/finalize` - 204 or 403 with the blocking notice
///
/// These bind the visitor session to the customer presenting the token.
pub fn api_routes() -> Router<VerificationAppState> {
    Router::new()
        .route(
            VERIFICATION_PATH,
            get(get_verification_status).delete(revoke_verification),
        )
        .route(FINALIZE_PATH, post(finalize_checkout))
}
