//! HTTP adapter for age verification.
//!
//! Exposes the start and callback transitions as browser redirects, the
//! gate decision as JSON, and enforcement at order finalization.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CallbackParams, CheckoutBlockedResponse, DecisionResponse, ErrorResponse, NoticeResponse,
    RevokeResponse, StartParams, VerificationStatusResponse,
};
pub use handlers::{health, VerificationApiError, VerificationAppState};
pub use routes::{api_routes, flow_routes, CALLBACK_PATH, FINALIZE_PATH, START_PATH, VERIFICATION_PATH};
