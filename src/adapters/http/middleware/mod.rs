//! HTTP middleware for axum.
//!
//! - `visitor` - visitor session cookie and extractor
//! - `auth` - optional customer identity from Bearer tokens

pub mod auth;
pub mod visitor;

pub use auth::{auth_middleware, AuthRejection, AuthState, OptionalAuth, RequireAuth};
pub use visitor::{
    visitor_session_middleware, MissingVisitorSession, SessionCookie, SessionCookieState,
    VisitorSession,
};
