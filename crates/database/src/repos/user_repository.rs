//! Repository for user data access operations.

use crate::entities::{CreateUserRecord, User, UserStatus};
use crate::types::{UserError, UserResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

const USER_COLUMNS: &str = "id, public_id, email, username, display_name, avatar_url, \
     password_hash, status, created_at, updated_at, last_seen_at";

/// Repository for user database operations
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> UserResult<User> {
        let status: String = row
            .try_get("status")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(User {
            id: row
                .try_get("id")
                .map_err(|e| UserError::DatabaseError(e.to_string()))?,
            public_id: row
                .try_get("public_id")
                .map_err(|e| UserError::DatabaseError(e.to_string()))?,
            email: row
                .try_get("email")
                .map_err(|e| UserError::DatabaseError(e.to_string()))?,
            username: row
                .try_get("username")
                .map_err(|e| UserError::DatabaseError(e.to_string()))?,
            display_name: row
                .try_get("display_name")
                .map_err(|e| UserError::DatabaseError(e.to_string()))?,
            avatar_url: row
                .try_get("avatar_url")
                .map_err(|e| UserError::DatabaseError(e.to_string()))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(|e| UserError::DatabaseError(e.to_string()))?,
            status: UserStatus::from(status.as_str()),
            created_at: row
                .try_get("created_at")
                .map_err(|e| UserError::DatabaseError(e.to_string()))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| UserError::DatabaseError(e.to_string()))?,
            last_seen_at: row
                .try_get("last_seen_at")
                .map_err(|e| UserError::DatabaseError(e.to_string()))?,
        })
    }

    /// Create a new user
    pub async fn create(&self, record: &CreateUserRecord) -> UserResult<User> {
        if self.find_by_email(&record.email).await?.is_some() {
            return Err(UserError::EmailAlreadyExists);
        }
        if self.find_by_username(&record.username).await?.is_some() {
            return Err(UserError::UsernameAlreadyExists);
        }

        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (public_id, email, username, display_name, avatar_url, password_hash, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(&record.email)
        .bind(&record.username)
        .bind(&record.display_name)
        .bind(&record.avatar_url)
        .bind(&record.password_hash)
        .bind(UserStatus::Active.to_string())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let user_id = result.last_insert_rowid();

        info!(
            user_id = user_id,
            public_id = %public_id,
            username = %record.username,
            "created new user"
        );

        Ok(User {
            id: user_id,
            public_id,
            email: record.email.clone(),
            username: record.username.clone(),
            display_name: record.display_name.clone(),
            avatar_url: record.avatar_url.clone(),
            password_hash: record.password_hash.clone(),
            status: UserStatus::Active,
            created_at: now.clone(),
            updated_at: now,
            last_seen_at: None,
        })
    }

    /// Find a user by internal ID
    pub async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// Find a user by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// Search active users by username or display name prefix, excluding the
    /// requesting user
    pub async fn search(
        &self,
        query: &str,
        exclude_user_id: i64,
        limit: i64,
    ) -> UserResult<Vec<User>> {
        let pattern = format!("{}%", query);

        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE status = 'active' AND id != ? AND (username LIKE ? OR display_name LIKE ?)
             ORDER BY username ASC LIMIT ?"
        ))
        .bind(exclude_user_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::from_row).collect()
    }

    /// Record that the user was seen just now
    pub async fn touch_last_seen(&self, user_id: i64) -> UserResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("UPDATE users SET last_seen_at = ? WHERE id = ?")
            .bind(&now)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
