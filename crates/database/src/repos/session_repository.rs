//! Repository for auth session data access operations.

use crate::entities::AuthSession;
use crate::types::{AuthError, AuthResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for session database operations
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> AuthResult<AuthSession> {
        Ok(AuthSession {
            id: row
                .try_get("id")
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?,
            token: row
                .try_get("token")
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?,
            user_id: row
                .try_get("user_id")
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?,
            is_active: row
                .try_get("is_active")
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?,
            expires_at: row
                .try_get("expires_at")
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?,
        })
    }

    /// Create a new session
    pub async fn create(
        &self,
        user_id: i64,
        token: &str,
        expires_at: &str,
    ) -> AuthResult<AuthSession> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO auth_sessions (token, user_id, is_active, created_at, updated_at, expires_at)
             VALUES (?, ?, TRUE, ?, ?, ?)",
        )
        .bind(token)
        .bind(user_id)
        .bind(&now)
        .bind(&now)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        info!(user_id = user_id, "created new session");

        Ok(AuthSession {
            id: result.last_insert_rowid(),
            token: token.to_string(),
            user_id,
            is_active: true,
            created_at: now.clone(),
            updated_at: now,
            expires_at: expires_at.to_string(),
        })
    }

    /// Find a session by token
    pub async fn find_by_token(&self, token: &str) -> AuthResult<Option<AuthSession>> {
        let row = sqlx::query(
            "SELECT id, token, user_id, is_active, created_at, updated_at, expires_at
             FROM auth_sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// Refresh the session's last-used timestamp
    pub async fn update_last_used(&self, token: &str) -> AuthResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("UPDATE auth_sessions SET updated_at = ? WHERE token = ?")
            .bind(&now)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Delete a session by token
    pub async fn delete_by_token(&self, token: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Delete all sessions for a user, returning how many were removed
    pub async fn delete_by_user_id(&self, user_id: i64) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn delete_expired(&self) -> AuthResult<u64> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= ?")
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Delete the oldest session of a user, returning whether one was removed
    pub async fn delete_oldest(&self, user_id: i64) -> AuthResult<bool> {
        let result = sqlx::query(
            "DELETE FROM auth_sessions WHERE id IN (
                 SELECT id FROM auth_sessions WHERE user_id = ? ORDER BY created_at ASC LIMIT 1
             )",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count active sessions for a user
    pub async fn count_active(&self, user_id: i64) -> AuthResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM auth_sessions WHERE user_id = ? AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CreateUserRecord;
    use crate::migrations::run_migrations;
    use crate::repos::UserRepository;
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, i64, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_sessions.db");
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePool::connect(&db_url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let user = UserRepository::new(pool.clone())
            .create(&CreateUserRecord {
                email: "session@example.com".to_string(),
                username: "sessionuser".to_string(),
                display_name: "Session User".to_string(),
                password_hash: "hash".to_string(),
                avatar_url: None,
            })
            .await
            .unwrap();

        (pool, user.id, temp_dir)
    }

    fn future_expiry() -> String {
        (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339()
    }

    #[tokio::test]
    async fn create_and_find_session() {
        let (pool, user_id, _temp_dir) = create_test_pool().await;
        let repo = SessionRepository::new(pool);

        let created = repo
            .create(user_id, "sess_abcdef0123456789", &future_expiry())
            .await
            .unwrap();
        assert!(created.is_active);

        let found = repo.find_by_token("sess_abcdef0123456789").await.unwrap();
        assert_eq!(found.unwrap().user_id, user_id);
    }

    #[tokio::test]
    async fn delete_by_token_removes_session() {
        let (pool, user_id, _temp_dir) = create_test_pool().await;
        let repo = SessionRepository::new(pool);

        repo.create(user_id, "sess_deleteme0123", &future_expiry())
            .await
            .unwrap();
        repo.delete_by_token("sess_deleteme0123").await.unwrap();

        assert!(repo.find_by_token("sess_deleteme0123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_expired_only_removes_stale_sessions() {
        let (pool, user_id, _temp_dir) = create_test_pool().await;
        let repo = SessionRepository::new(pool);

        let past = (chrono::Utc::now() - chrono::Duration::hours(1)).to_rfc3339();
        repo.create(user_id, "sess_expired01234", &past).await.unwrap();
        repo.create(user_id, "sess_alive0123456", &future_expiry())
            .await
            .unwrap();

        let removed = repo.delete_expired().await.unwrap();

        assert_eq!(removed, 1);
        assert!(repo.find_by_token("sess_expired01234").await.unwrap().is_none());
        assert!(repo.find_by_token("sess_alive0123456").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_by_user_id_counts_sessions() {
        let (pool, user_id, _temp_dir) = create_test_pool().await;
        let repo = SessionRepository::new(pool);

        repo.create(user_id, "sess_one012345678", &future_expiry())
            .await
            .unwrap();
        repo.create(user_id, "sess_two012345678", &future_expiry())
            .await
            .unwrap();

        assert_eq!(repo.count_active(user_id).await.unwrap(), 2);
        assert_eq!(repo.delete_by_user_id(user_id).await.unwrap(), 2);
        assert_eq!(repo.count_active(user_id).await.unwrap(), 0);
    }
}
