//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `SessionStore` - ephemeral per-visitor key-value storage
//! - `ProfileStore` - durable per-customer key-value storage
//!
//! ## Identity Ports
//!
//! - `IdentityProvider` - external OIDC capability (code exchange, claims)
//! - `IdentityProviderFactory` - memoized construction from configuration
//! - `SessionValidator` - storefront customer token validation

mod identity_provider;
mod profile_store;
mod session_store;
mod session_validator;

pub use identity_provider::{IdentityProvider, IdentityProviderFactory, ProviderSession};
pub use profile_store::ProfileStore;
pub use session_store::SessionStore;
pub use session_validator::SessionValidator;
