//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - storefront customer token validation
//! - `oidc` - identity provider client
//! - `session_store` - session tier (in-memory, Redis)
//! - `profile_store` - durable tier (in-memory, PostgreSQL)
//! - `http` - axum routes and middleware

pub mod auth;
pub mod http;
pub mod oidc;
pub mod profile_store;
pub mod session_store;
