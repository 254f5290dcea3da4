//! Session store port - ephemeral per-visitor key-value storage.
//!
//! Values live as long as the visitor's browsing session. Implementations
//! decide expiry (in-memory for tests and single-node, Redis in production).

use async_trait::async_trait;

use crate::domain::foundation::VisitorId;
use crate::domain::verification::StoreError;

/// Key-value storage scoped to one visitor session.
///
/// # Contract
///
/// - `get` of a key that was never set returns `Ok(None)`
/// - `set` overwrites any previous value
/// - `remove` of an absent key is not an error
/// - Backend failures return `StoreError::SessionUnavailable`
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, visitor: &VisitorId, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, visitor: &VisitorId, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, visitor: &VisitorId, key: &str) -> Result<(), StoreError>;
}
