//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, identity)
//! - `verification` - Age verification status, records and the checkout gate

pub mod foundation;
pub mod verification;
