//! Identity provider adapters.
//!
//! - `HttpIdentityProvider` - reqwest client for the provider's OIDC endpoints
//! - `OidcProviderFactory` - builds that client once from configuration
//! - `MockIdentityProvider` / `StaticProviderFactory` - scripted stand-ins for tests

mod factory;
mod http_provider;
mod mock;

pub use factory::{OidcProviderFactory, StaticProviderFactory};
pub use http_provider::{HttpIdentityProvider, OidcClientSettings};
pub use mock::{MockIdentityProvider, MOCK_AUTHORIZE_URL};
