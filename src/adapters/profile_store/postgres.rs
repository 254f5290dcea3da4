//! PostgreSQL implementation of ProfileStore.
//!
//! Metadata lives in `user_profile_meta`, one row per (user, key). See
//! `migrations/` for the schema.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::UserId;
use crate::domain::verification::StoreError;
use crate::ports::ProfileStore;

/// PostgreSQL implementation of the ProfileStore port.
#[derive(Debug, Clone)]
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    /// Creates a new PostgresProfileStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::profile(format!("Migration failed: {}", e)))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MetaRow {
    meta_value: String,
}

fn to_store_error(action: &str, e: sqlx::Error) -> StoreError {
    StoreError::profile(format!("Failed to {} profile metadata: {}", action, e))
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn get(&self, user: &UserId, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<MetaRow> = sqlx::query_as(
            r#"
            SELECT meta_value
            FROM user_profile_meta
            WHERE user_id = $1 AND meta_key = $2
            "#,
        )
        .bind(user.as_str())
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| to_store_error("read", e))?;

        Ok(row.map(|r| r.meta_value))
    }

    async fn set(&self, user: &UserId, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_profile_meta (user_id, meta_key, meta_value, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, meta_key)
            DO UPDATE SET meta_value = EXCLUDED.meta_value, updated_at = NOW()
            "#,
        )
        .bind(user.as_str())
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| to_store_error("write", e))?;

        Ok(())
    }

    async fn remove(&self, user: &UserId, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM user_profile_meta WHERE user_id = $1 AND meta_key = $2")
            .bind(user.as_str())
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| to_store_error("delete", e))?;

        Ok(())
    }
}
