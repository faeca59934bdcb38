//! SQLite-backed session storage

use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::task::JoinHandle;

use super::session::{SessionData, SessionError, SessionId};

/// Session rows in the `sessions` table, stored as JSON
#[derive(Debug, Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    /// Store backed by `pool`
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load a session that exists and has not expired
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] on database failure or
    /// [`SessionError::Serialization`] if the stored JSON is corrupt
    pub async fn load(&self, id: &SessionId) -> Result<Option<SessionData>, SessionError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM sessions WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some((json,)) = row else {
            return Ok(None);
        };

        let data: SessionData = serde_json::from_str(&json)?;
        if data.is_expired() {
            self.delete(id).await?;
            return Ok(None);
        }

        Ok(Some(data))
    }

    /// Insert or replace a session
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if serialization or the write fails
    pub async fn save(&self, id: &SessionId, data: &SessionData) -> Result<(), SessionError> {
        let json = serde_json::to_string(data)?;

        sqlx::query(
            "INSERT INTO sessions (id, data, expires_at) VALUES (?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET data = excluded.data, expires_at = excluded.expires_at",
        )
        .bind(id.as_str())
        .bind(json)
        .bind(data.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a session
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] on database failure
    pub async fn delete(&self, id: &SessionId) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove every expired session, returning how many were deleted
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] on database failure
    pub async fn purge_expired(&self) -> Result<u64, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Purge expired sessions now and then every `period`, until the task is
    /// aborted or the runtime shuts down
    #[must_use]
    pub fn spawn_purge_task(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match store.purge_expired().await {
                    Ok(0) => {}
                    Ok(purged) => tracing::debug!(purged, "expired sessions removed"),
                    Err(e) => tracing::warn!(error = %e, "failed to purge expired sessions"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Duration;

    #[tokio::test]
    async fn test_save_and_load() {
        let pool = db::memory_pool().await.unwrap();
        let store = SessionStore::new(pool);
        let id = SessionId::generate();
        let mut data = SessionData::default();
        data.user_id = Some(5);
        data.set("num_visits", 2_u32).unwrap();

        store.save(&id, &data).await.unwrap();
        let loaded = store.load(&id).await.unwrap().unwrap();

        assert_eq!(loaded.user_id, Some(5));
        assert_eq!(loaded.get::<u32>("num_visits"), Some(2));
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let pool = db::memory_pool().await.unwrap();
        let store = SessionStore::new(pool);
        assert!(store.load(&SessionId::generate()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let pool = db::memory_pool().await.unwrap();
        let store = SessionStore::new(pool);
        let id = SessionId::generate();
        store
            .save(&id, &SessionData::with_expiration(Duration::seconds(-5)))
            .await
            .unwrap();

        assert!(store.load(&id).await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let pool = db::memory_pool().await.unwrap();
        let store = SessionStore::new(pool);
        store
            .save(&SessionId::generate(), &SessionData::with_expiration(Duration::seconds(-5)))
            .await
            .unwrap();
        store
            .save(&SessionId::generate(), &SessionData::default())
            .await
            .unwrap();

        assert_eq!(store.purge_expired().await.unwrap(), 1);
    }

    async fn stored_rows(store: &SessionStore) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn test_purge_task_sweeps_repeatedly() {
        let pool = db::memory_pool().await.unwrap();
        let store = SessionStore::new(pool);
        let expired = || SessionData::with_expiration(Duration::seconds(-5));
        store.save(&SessionId::generate(), &expired()).await.unwrap();
        store
            .save(&SessionId::generate(), &SessionData::default())
            .await
            .unwrap();

        let task = store.spawn_purge_task(std::time::Duration::from_millis(20));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(stored_rows(&store).await, 1);

        store.save(&SessionId::generate(), &expired()).await.unwrap();
        assert_eq!(stored_rows(&store).await, 2);
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(stored_rows(&store).await, 1);

        task.abort();
    }
}
