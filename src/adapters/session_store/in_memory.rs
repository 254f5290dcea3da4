//! In-memory session store for testing and single-node development.
//!
//! Not suitable for multi-server deployments: sessions live in this
//! process only. With a TTL, every write sweeps expired sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::domain::foundation::VisitorId;
use crate::domain::verification::StoreError;
use crate::ports::SessionStore;

/// Values for one visitor plus when they were last touched.
#[derive(Debug, Clone)]
struct SessionEntry {
    values: HashMap<String, String>,
    touched_at: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            touched_at: Instant::now(),
        }
    }
}

/// In-memory session store with optional idle expiry.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<VisitorId, SessionEntry>>>,
    ttl: Option<Duration>,
}

impl InMemorySessionStore {
    /// Creates a store whose sessions never expire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire sessions idle for longer than `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.values().filter(|e| !self.is_expired(e)).count()
    }

    /// Drops every session (what a session-store flush does).
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }

    fn is_expired(&self, entry: &SessionEntry) -> bool {
        self.ttl
            .map(|ttl| entry.touched_at.elapsed() > ttl)
            .unwrap_or(false)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, visitor: &VisitorId, key: &str) -> Result<Option<String>, StoreError> {
        let mut sessions = self.sessions.write().await;
        let expired = sessions
            .get(visitor)
            .map(|entry| self.is_expired(entry))
            .unwrap_or(false);
        if expired {
            sessions.remove(visitor);
            return Ok(None);
        }
        Ok(sessions.get_mut(visitor).and_then(|entry| {
            entry.touched_at = Instant::now();
            entry.values.get(key).cloned()
        }))
    }

    async fn set(&self, visitor: &VisitorId, key: &str, value: &str) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        // Visitors who never come back are only reclaimed here.
        if self.ttl.is_some() {
            sessions.retain(|_, entry| !self.is_expired(entry));
        }
        let entry = sessions.entry(*visitor).or_insert_with(SessionEntry::new);
        entry.touched_at = Instant::now();
        entry.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, visitor: &VisitorId, key: &str) -> Result<(), StoreError> {
        if let Some(entry) = self.sessions.write().await.get_mut(visitor) {
            entry.values.remove(key);
        }
        Ok(())
    }
}
