//! Customer authentication adapters.
//!
//! - `JwtSessionValidator` - HS256 storefront tokens (production)
//! - `MockSessionValidator` - token table for tests

mod jwt;
mod mock;

pub use jwt::{CustomerClaims, JwtSessionValidator};
pub use mock::MockSessionValidator;
