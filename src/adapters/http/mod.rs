//! HTTP adapters - axum router, middleware and the verification endpoints.

pub mod middleware;
pub mod verification;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use middleware::{auth_middleware, visitor_session_middleware, AuthState, SessionCookie};
pub use verification::{api_routes, flow_routes, VerificationAppState};

/// Assemble the application router.
///
/// Every verification route runs behind the visitor session middleware.
/// The API routes also run behind the customer identity middleware when a
/// validator is supplied; the browser flow routes never do, so a stale
/// token cannot turn the callback into an error page. `/health` runs behind
/// neither so probes do not mint sessions.
pub fn app_router(
    state: VerificationAppState,
    cookie: SessionCookie,
    validator: Option<AuthState>,
) -> Router {
    let mut api = api_routes();
    if let Some(validator) = validator {
        api = api.layer(axum::middleware::from_fn_with_state(
            validator,
            auth_middleware,
        ));
    }
    let routes = flow_routes().merge(api).layer(axum::middleware::from_fn_with_state(
        Arc::new(cookie),
        visitor_session_middleware,
    ));

    Router::new()
        .merge(routes)
        .route("/health", get(verification::health))
        .with_state(state)
}
