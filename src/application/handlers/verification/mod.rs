//! Verification handlers.
//!
//! ## Commands
//! - Starting verification (redirect to the identity provider)
//! - Completing verification (provider callback)
//! - Revoking a customer's durable verification
//!
//! ## Queries
//! - Resolving the current verification status
//! - Evaluating the checkout gate

mod complete_verification;
mod evaluate_checkout;
mod resolve_status;
mod revoke_verification;
mod start_verification;

// Commands
pub use complete_verification::{
    CompleteVerificationCommand, CompleteVerificationHandler, CompleteVerificationResult,
};
pub use revoke_verification::{
    RevokeVerificationCommand, RevokeVerificationHandler, RevokeVerificationResult,
};
pub use start_verification::{
    StartVerificationCommand, StartVerificationHandler, StartVerificationResult,
};

// Queries
pub use evaluate_checkout::{EvaluateCheckoutHandler, EvaluateCheckoutQuery, EvaluateCheckoutResult};
pub use resolve_status::{ResolveStatusHandler, ResolveStatusQuery, ResolveStatusResult, StatusSource};
