//! Age Gate - checkout age verification for an online storefront
//!
//! Blocks order finalization until the visitor has proven, through an
//! external OIDC identity provider, that they are over the legal age. The
//! outcome is cached per browser session and, for logged-in customers,
//! persisted so later sessions skip the check.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
