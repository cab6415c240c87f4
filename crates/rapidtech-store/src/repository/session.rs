//! # Session Repository
//!
//! Server-side token records. Deleting a row revokes its token even while
//! the token's own signature and expiry would still verify.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use rapidtech_core::Session;

/// Repository for session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Records a freshly issued token. Re-issuing the same token replaces it.
    pub async fn insert(&self, session: &Session) -> DbResult<()> {
        debug!(user_id = %session.user_id, "Recording session");

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO sessions (token, user_id, role, expires_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&session.token)
        .bind(&session.user_id)
        .bind(session.role)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, token: &str) -> DbResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT token, user_id, role, expires_at, created_at FROM sessions WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Removes a session. Returns true if one existed.
    pub async fn delete(&self, token: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes `token` only if it is expired at `now`.
    ///
    /// Single statement, so a concurrent refresh of the same token cannot be
    /// lost between the check and the delete.
    pub async fn delete_if_expired(&self, token: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?1 AND expires_at < ?2")
            .bind(token)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes every session expired at `now`. Returns how many were removed.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        debug!(removed = result.rows_affected(), "Purged expired sessions");
        Ok(result.rows_affected())
    }
}
