//! Session store adapters.
//!
//! - `InMemorySessionStore` - testing and single-node development
//! - `RedisSessionStore` - production, shared across servers

mod in_memory;
mod redis;

pub use in_memory::InMemorySessionStore;
pub use redis::RedisSessionStore;
