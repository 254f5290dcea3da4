//! Age verification domain.
//!
//! - `VerificationStatus` - the four-state status of a visitor
//! - `AuthSession` / `UserVerificationRecord` - session and durable records
//! - `RedirectTarget` - where the callback returns the visitor
//! - `CheckoutGate` - maps a status to allow/block at checkout
//! - `claim` - interpretation of the provider's age claim

pub mod claim;
mod errors;
mod gate;
mod redirect;
mod session;
mod status;

pub use errors::{ConfigurationError, ProviderError, StoreError, VerificationError};
pub use gate::{CheckoutDecision, CheckoutGate, CheckoutNotice, NoticeKind, NoticeMessages};
pub use redirect::RedirectTarget;
pub use session::{AuthSession, UserVerificationRecord};
pub use status::VerificationStatus;
