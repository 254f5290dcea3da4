//! Profile store port - durable per-customer key-value storage.

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::domain::verification::StoreError;

/// Persistent metadata keyed by authenticated customer identity.
///
/// # Contract
///
/// - Values survive across visitor sessions
/// - `set` is an upsert; writing the same value twice is harmless
/// - `remove` of an absent key is not an error
/// - Backend failures return `StoreError::ProfileUnavailable`
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user: &UserId, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, user: &UserId, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, user: &UserId, key: &str) -> Result<(), StoreError>;
}
