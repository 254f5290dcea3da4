//! In-memory profile store for tests and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::UserId;
use crate::domain::verification::StoreError;
use crate::ports::ProfileStore;

/// Profile metadata held in process memory, lost on restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    entries: Arc<RwLock<HashMap<(UserId, String), String>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored metadata entries across all customers.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user: &UserId, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(&(user.clone(), key.to_string())).cloned())
    }

    async fn set(&self, user: &UserId, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert((user.clone(), key.to_string()), value.to_string());
        Ok(())
    }

    async fn remove(&self, user: &UserId, key: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .remove(&(user.clone(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn starts_empty() {
        let store = InMemoryProfileStore::new();
        assert!(store.is_empty().await);
        assert_eq!(store.get(&user("u1"), "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_is_an_upsert() {
        let store = InMemoryProfileStore::new();
        let u = user("u1");

        store.set(&u, "k", "one").await.unwrap();
        store.set(&u, "k", "two").await.unwrap();

        assert_eq!(store.get(&u, "k").await.unwrap(), Some("two".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn values_are_scoped_per_user() {
        let store = InMemoryProfileStore::new();
        store.set(&user("u1"), "k", "v").await.unwrap();

        assert_eq!(store.get(&user("u2"), "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_deletes_value_and_tolerates_absence() {
        let store = InMemoryProfileStore::new();
        let u = user("u1");
        store.set(&u, "k", "v").await.unwrap();

        store.remove(&u, "k").await.unwrap();
        store.remove(&u, "k").await.unwrap();

        assert_eq!(store.get(&u, "k").await.unwrap(), None);
    }
}
