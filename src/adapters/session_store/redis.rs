//! Redis-backed session store for production deployments.
//!
//! Each visitor session is one Redis hash. Every write refreshes the hash's
//! expiry, so a session lives for `ttl` after its last change.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::VisitorId;
use crate::domain::verification::StoreError;
use crate::ports::SessionStore;

const KEY_PREFIX: &str = "age_gate:session:";

/// Redis session store, safe to share across servers.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    ttl: Duration,
}

impl RedisSessionStore {
    pub fn new(conn: MultiplexedConnection, ttl: Duration) -> Self {
        Self { conn, ttl }
    }

    /// Connects to the given Redis URL.
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(to_store_error)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(to_store_error)?;
        Ok(Self::new(conn, ttl))
    }

    fn redis_key(visitor: &VisitorId) -> String {
        format!("{}{}", KEY_PREFIX, visitor)
    }
}

fn to_store_error(e: redis::RedisError) -> StoreError {
    StoreError::session(e.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, visitor: &VisitorId, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        conn.hget(Self::redis_key(visitor), key)
            .await
            .map_err(to_store_error)
    }

    async fn set(&self, visitor: &VisitorId, key: &str, value: &str) -> Result<(), StoreError> {
        let redis_key = Self::redis_key(visitor);
        let mut conn = self.conn.clone();

        redis::pipe()
            .atomic()
            .hset(&redis_key, key, value)
            .ignore()
            .expire(&redis_key, self.ttl.as_secs().max(1) as i64)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(to_store_error)
    }

    async fn remove(&self, visitor: &VisitorId, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.hdel::<_, _, ()>(Self::redis_key(visitor), key)
            .await
            .map_err(to_store_error)
    }
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
