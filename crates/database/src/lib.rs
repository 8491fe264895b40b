//! Parley Database Crate
//!
//! This crate provides database functionality for the Parley messaging
//! backend, including connection management, migrations, and repository
//! implementations.

use sqlx::SqlitePool;

use parley_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{
    ChatRepository, MemberRepository, MessageRepository, SessionRepository, UserRepository,
};

// Re-export entities
pub use entities::{
    chat::{Chat, ChatStatus, ChatType},
    member::{ChatMember, ChatMemberProfile, MemberRole},
    message::ChatMessage,
    session::AuthSession,
    user::{CreateUserRecord, User, UserStatus},
};

// Re-export types
pub use types::{
    errors::{AuthError, ChatError, DatabaseError, UserError},
    AuthResult, ChatResult, DatabaseResult, UserResult,
};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn initialize_database_applies_migrations() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("init.db");

        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'chats'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }
}
