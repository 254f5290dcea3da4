//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers drive the verification transitions; query handlers read
//! the resolved status and the checkout decision.

pub mod handlers;
mod status_store;

pub use status_store::StatusStore;
pub use status_store::{
    PROFILE_VERIFIED_AT_KEY, PROFILE_VERIFIED_KEY, SESSION_REDIRECT_KEY, SESSION_STATE_KEY,
    SESSION_STATUS_KEY, SESSION_USER_KEY,
};
