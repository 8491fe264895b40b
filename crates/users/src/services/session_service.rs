//! Session service for managing bearer-token sessions

use parley_database::{AuthError, AuthResult, AuthSession, SessionRepository};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::utils::token::generate_token;

const MAX_SESSIONS_PER_USER: i64 = 10;

/// Service for session lifecycle operations
pub struct SessionService {
    sessions: SessionRepository,
    ttl_seconds: i64,
}

impl SessionService {
    pub fn new(pool: SqlitePool, ttl_seconds: u64) -> Self {
        let ttl_seconds = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        Self {
            sessions: SessionRepository::new(pool),
            ttl_seconds,
        }
    }

    /// Issue a fresh session for a user.
    ///
    /// A user holds at most `MAX_SESSIONS_PER_USER` sessions; the oldest one
    /// is evicted to make room.
    pub async fn issue(&self, user_id: i64) -> AuthResult<AuthSession> {
        if self.sessions.count_active(user_id).await? >= MAX_SESSIONS_PER_USER {
            self.sessions.delete_oldest(user_id).await?;
            warn!(user_id = user_id, "session limit reached, evicted oldest session");
        }

        let token = generate_token();
        let expires_at = (chrono::Utc::now() + chrono::Duration::seconds(self.ttl_seconds))
            .to_rfc3339();

        let session = self.sessions.create(user_id, &token, &expires_at).await?;

        info!(user_id = user_id, "issued new session");
        Ok(session)
    }

    /// Validate a bearer token and refresh its last-used timestamp.
    ///
    /// Expired sessions are removed as a side effect.
    pub async fn validate(&self, token: &str) -> AuthResult<AuthSession> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidSession);
        }

        let session = self
            .sessions
            .find_by_token(token)
            .await?
            .ok_or(AuthError::InvalidSession)?;

        if !session.is_active {
            return Err(AuthError::SessionExpired);
        }

        if session.is_expired() {
            self.sessions.delete_by_token(token).await?;
            return Err(AuthError::SessionExpired);
        }

        self.sessions.update_last_used(token).await?;
        Ok(session)
    }

    /// Revoke a session (logout)
    pub async fn revoke(&self, token: &str) -> AuthResult<()> {
        self.sessions
            .find_by_token(token)
            .await?
            .ok_or(AuthError::InvalidSession)?;

        self.sessions.delete_by_token(token).await
    }

    /// Revoke every session of a user (logout from all devices)
    pub async fn revoke_all(&self, user_id: i64) -> AuthResult<u64> {
        let count = self.sessions.delete_by_user_id(user_id).await?;
        info!(user_id = user_id, count = count, "revoked all sessions");
        Ok(count)
    }

    /// Remove all expired sessions
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let count = self.sessions.delete_expired().await?;
        if count > 0 {
            info!(count = count, "cleaned up expired sessions");
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_database::{run_migrations, CreateUserRecord, UserRepository};
    use tempfile::TempDir;

    async fn create_service() -> (SessionService, SqlitePool, i64, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_session_service.db");
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path.display()))
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();

        let user = UserRepository::new(pool.clone())
            .create(&CreateUserRecord {
                email: "sess@example.com".to_string(),
                username: "sess".to_string(),
                display_name: "Sess".to_string(),
                password_hash: "hash".to_string(),
                avatar_url: None,
            })
            .await
            .unwrap();

        (SessionService::new(pool.clone(), 3600), pool, user.id, temp_dir)
    }

    #[tokio::test]
    async fn issue_and_validate_session() {
        let (service, _pool, user_id, _temp_dir) = create_service().await;

        let session = service.issue(user_id).await.unwrap();
        assert!(!session.token.is_empty());

        let validated = service.validate(&session.token).await.unwrap();
        assert_eq!(validated.user_id, user_id);
    }

    #[tokio::test]
    async fn validate_rejects_unknown_and_empty_tokens() {
        let (service, _pool, _user_id, _temp_dir) = create_service().await;

        assert!(matches!(
            service.validate("unknown-token").await,
            Err(AuthError::InvalidSession)
        ));
        assert!(matches!(service.validate("").await, Err(AuthError::InvalidSession)));
    }

    #[tokio::test]
    async fn expired_session_is_removed_on_validation() {
        let (service, pool, user_id, _temp_dir) = create_service().await;

        let session = service.issue(user_id).await.unwrap();

        let past = (chrono::Utc::now() - chrono::Duration::hours(1)).to_rfc3339();
        sqlx::query("UPDATE auth_sessions SET expires_at = ? WHERE token = ?")
            .bind(&past)
            .bind(&session.token)
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(
            service.validate(&session.token).await,
            Err(AuthError::SessionExpired)
        ));
        // A second validation sees no session at all.
        assert!(matches!(
            service.validate(&session.token).await,
            Err(AuthError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn revoke_ends_the_session() {
        let (service, _pool, user_id, _temp_dir) = create_service().await;

        let session = service.issue(user_id).await.unwrap();
        service.revoke(&session.token).await.unwrap();

        assert!(matches!(
            service.validate(&session.token).await,
            Err(AuthError::InvalidSession)
        ));
        assert!(matches!(
            service.revoke(&session.token).await,
            Err(AuthError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn session_cap_evicts_oldest() {
        let (service, _pool, user_id, _temp_dir) = create_service().await;

        let first = service.issue(user_id).await.unwrap();
        for _ in 0..MAX_SESSIONS_PER_USER {
            service.issue(user_id).await.unwrap();
        }

        assert!(matches!(
            service.validate(&first.token).await,
            Err(AuthError::InvalidSession)
        ));
    }

    #[tokio::test]
    async fn revoke_all_removes_every_session() {
        let (service, _pool, user_id, _temp_dir) = create_service().await;

        service.issue(user_id).await.unwrap();
        service.issue(user_id).await.unwrap();

        let removed = service.revoke_all(user_id).await.unwrap();
        assert_eq!(removed, 2);
    }
}
