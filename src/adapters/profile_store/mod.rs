//! Profile store adapters.
//!
//! - `InMemoryProfileStore` - testing and development
//! - `PostgresProfileStore` - production, backed by `user_profile_meta`

mod in_memory;
mod postgres;

pub use in_memory::InMemoryProfileStore;
pub use postgres::PostgresProfileStore;
