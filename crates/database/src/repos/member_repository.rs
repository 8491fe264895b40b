//! Repository for chat member data access operations.

use crate::entities::{ChatMember, ChatMemberProfile, MemberRole};
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for member database operations
pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    /// Create a new member repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> ChatResult<ChatMember> {
        let role: String = row
            .try_get("role")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(ChatMember {
            id: row
                .try_get("id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            chat_id: row
                .try_get("chat_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            user_id: row
                .try_get("user_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            role: MemberRole::from(role.as_str()),
            joined_at: row
                .try_get("joined_at")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        })
    }

    fn profile_from_row(row: &SqliteRow) -> ChatResult<ChatMemberProfile> {
        let role: String = row
            .try_get("role")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(ChatMemberProfile {
            id: row
                .try_get("id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            chat_id: row
                .try_get("chat_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            user_id: row
                .try_get("user_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            user_public_id: row
                .try_get("user_public_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            username: row
                .try_get("username")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            display_name: row
                .try_get("display_name")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            avatar_url: row
                .try_get("avatar_url")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            role: MemberRole::from(role.as_str()),
            joined_at: row
                .try_get("joined_at")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        })
    }

    /// Add a member to a chat
    pub async fn add(
        &self,
        chat_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> ChatResult<ChatMember> {
        if self.find_by_chat_and_user(chat_id, user_id).await?.is_some() {
            return Err(ChatError::MemberAlreadyExists);
        }

        let now = chrono::Utc::now().to_rfc3339();

        let result =
            sqlx::query("INSERT INTO chat_members (chat_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)")
                .bind(chat_id)
                .bind(user_id)
                .bind(role.to_string())
                .bind(&now)
                .execute(&self.pool)
                .await
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        info!(
            chat_id = chat_id,
            user_id = user_id,
            role = %role,
            "added member to chat"
        );

        Ok(ChatMember {
            id: result.last_insert_rowid(),
            chat_id,
            user_id,
            role,
            joined_at: now,
        })
    }

    /// Find all members of a chat with their user profiles
    pub async fn find_by_chat(&self, chat_id: i64) -> ChatResult<Vec<ChatMemberProfile>> {
        let rows = sqlx::query(
            "SELECT cm.id, cm.chat_id, cm.user_id, cm.role, cm.joined_at,
                    u.public_id AS user_public_id, u.username, u.display_name, u.avatar_url
             FROM chat_members cm
             JOIN users u ON u.id = cm.user_id
             WHERE cm.chat_id = ?
             ORDER BY cm.joined_at ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::profile_from_row).collect()
    }

    /// Find a membership row by chat and user
    pub async fn find_by_chat_and_user(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> ChatResult<Option<ChatMember>> {
        let row = sqlx::query(
            "SELECT id, chat_id, user_id, role, joined_at
             FROM chat_members WHERE chat_id = ? AND user_id = ?",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// User IDs of every member of a chat, for event fan-out
    pub async fn member_ids(&self, chat_id: i64) -> ChatResult<Vec<i64>> {
        let rows = sqlx::query("SELECT user_id FROM chat_members WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get("user_id")
                    .map_err(|e| ChatError::DatabaseError(e.to_string()))
            })
            .collect()
    }

    /// Update a member's role
    pub async fn update_role(
        &self,
        chat_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> ChatResult<()> {
        let result = sqlx::query("UPDATE chat_members SET role = ? WHERE chat_id = ? AND user_id = ?")
            .bind(role.to_string())
            .bind(chat_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ChatError::MemberNotFound);
        }

        Ok(())
    }

    /// Remove a member from a chat
    pub async fn remove(&self, chat_id: i64, user_id: i64) -> ChatResult<()> {
        let result = sqlx::query("DELETE FROM chat_members WHERE chat_id = ? AND user_id = ?")
            .bind(chat_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ChatError::MemberNotFound);
        }

        info!(chat_id = chat_id, user_id = user_id, "removed member from chat");
        Ok(())
    }

    /// Count members of a chat
    pub async fn count(&self, chat_id: i64) -> ChatResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_members WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ChatType, CreateUserRecord};
    use crate::migrations::run_migrations;
    use crate::repos::{ChatRepository, UserRepository};
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_members.db");
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePool::connect(&db_url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        (pool, temp_dir)
    }

    async fn create_user(pool: &SqlitePool, username: &str) -> i64 {
        UserRepository::new(pool.clone())
            .create(&CreateUserRecord {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                display_name: username.to_string(),
                password_hash: "hash".to_string(),
                avatar_url: None,
            })
            .await
            .unwrap()
            .id
    }

    async fn create_chat(pool: &SqlitePool, created_by: i64) -> i64 {
        ChatRepository::new(pool.clone())
            .create(created_by, Some("Test"), ChatType::Group)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn add_and_list_members_with_profiles() {
        let (pool, _temp_dir) = create_test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let chat_id = create_chat(&pool, alice).await;

        let repo = MemberRepository::new(pool);
        repo.add(chat_id, alice, MemberRole::Owner).await.unwrap();
        repo.add(chat_id, bob, MemberRole::Member).await.unwrap();

        let members = repo.find_by_chat(chat_id).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].username, "alice");
        assert_eq!(members[0].role, MemberRole::Owner);
        assert_eq!(members[1].username, "bob");
    }

    #[tokio::test]
    async fn duplicate_membership_is_rejected() {
        let (pool, _temp_dir) = create_test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let chat_id = create_chat(&pool, alice).await;

        let repo = MemberRepository::new(pool);
        repo.add(chat_id, alice, MemberRole::Owner).await.unwrap();

        let result = repo.add(chat_id, alice, MemberRole::Member).await;
        assert!(matches!(result, Err(ChatError::MemberAlreadyExists)));
    }

    #[tokio::test]
    async fn member_ids_returns_all_members() {
        let (pool, _temp_dir) = create_test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let chat_id = create_chat(&pool, alice).await;

        let repo = MemberRepository::new(pool);
        repo.add(chat_id, alice, MemberRole::Owner).await.unwrap();
        repo.add(chat_id, bob, MemberRole::Member).await.unwrap();

        let mut ids = repo.member_ids(chat_id).await.unwrap();
        ids.sort();
        assert_eq!(ids, vec![alice, bob]);
    }

    #[tokio::test]
    async fn remove_member_deletes_membership() {
        let (pool, _temp_dir) = create_test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let chat_id = create_chat(&pool, alice).await;

        let repo = MemberRepository::new(pool);
        repo.add(chat_id, alice, MemberRole::Owner).await.unwrap();
        repo.add(chat_id, bob, MemberRole::Member).await.unwrap();

        repo.remove(chat_id, bob).await.unwrap();
        assert!(repo.find_by_chat_and_user(chat_id, bob).await.unwrap().is_none());
        assert_eq!(repo.count(chat_id).await.unwrap(), 1);

        let result = repo.remove(chat_id, bob).await;
        assert!(matches!(result, Err(ChatError::MemberNotFound)));
    }

    #[tokio::test]
    async fn update_role_promotes_member() {
        let (pool, _temp_dir) = create_test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;
        let chat_id = create_chat(&pool, alice).await;

        let repo = MemberRepository::new(pool);
        repo.add(chat_id, alice, MemberRole::Owner).await.unwrap();
        repo.add(chat_id, bob, MemberRole::Member).await.unwrap();

        repo.update_role(chat_id, bob, MemberRole::Admin).await.unwrap();

        let member = repo.find_by_chat_and_user(chat_id, bob).await.unwrap().unwrap();
        assert_eq!(member.role, MemberRole::Admin);
    }
}
