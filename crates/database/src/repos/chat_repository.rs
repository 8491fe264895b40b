//! Repository for chat data access operations.

use crate::entities::{Chat, ChatStatus, ChatType};
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

const CHAT_COLUMNS: &str = "c.id, c.public_id, c.title, c.chat_type, c.status, c.created_by, c.created_at, c.updated_at, \
     (SELECT COUNT(*) FROM chat_members WHERE chat_id = c.id) AS member_count, \
     (SELECT MAX(created_at) FROM messages WHERE chat_id = c.id AND deleted_at IS NULL) AS last_message_at";

/// Repository for chat database operations
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    /// Create a new chat repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> ChatResult<Chat> {
        let chat_type: String = row
            .try_get("chat_type")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;
        let status: String = row
            .try_get("status")
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(Chat {
            id: row
                .try_get("id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            public_id: row
                .try_get("public_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            title: row
                .try_get("title")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            chat_type: ChatType::from(chat_type.as_str()),
            status: ChatStatus::from(status.as_str()),
            created_by: row
                .try_get("created_by")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            member_count: row
                .try_get("member_count")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            last_message_at: row
                .try_get("last_message_at")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        })
    }

    /// Create a new chat
    pub async fn create(
        &self,
        created_by: i64,
        title: Option<&str>,
        chat_type: ChatType,
    ) -> ChatResult<Chat> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO chats (public_id, title, chat_type, status, created_by, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(title)
        .bind(chat_type.to_string())
        .bind(ChatStatus::Active.to_string())
        .bind(created_by)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let chat_id = result.last_insert_rowid();

        info!(
            chat_id = chat_id,
            public_id = %public_id,
            created_by = created_by,
            chat_type = %chat_type,
            "created new chat"
        );

        Ok(Chat {
            id: chat_id,
            public_id,
            title: title.map(|t| t.to_string()),
            chat_type,
            status: ChatStatus::Active,
            created_by,
            created_at: now.clone(),
            updated_at: now,
            member_count: 0,
            last_message_at: None,
        })
    }

    /// Find a chat by public ID, excluding deleted chats
    pub async fn find_by_public_id(&self, public_id: &str) -> ChatResult<Option<Chat>> {
        let row = sqlx::query(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats c WHERE c.public_id = ? AND c.status != 'deleted'"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// Find all chats a user belongs to, most recently active first
    pub async fn find_for_user(&self, user_id: i64) -> ChatResult<Vec<Chat>> {
        let rows = sqlx::query(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats c
             JOIN chat_members cm ON c.id = cm.chat_id
             WHERE cm.user_id = ? AND c.status != 'deleted'
             ORDER BY c.updated_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::from_row).collect()
    }

    /// Find the active direct chat between two users, if one exists
    pub async fn find_direct_between(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> ChatResult<Option<Chat>> {
        let row = sqlx::query(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats c
             JOIN chat_members cm1 ON c.id = cm1.chat_id
             JOIN chat_members cm2 ON c.id = cm2.chat_id
             WHERE c.chat_type = 'direct'
               AND c.status = 'active'
               AND cm1.user_id = ?
               AND cm2.user_id = ?"
        ))
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// Rename a chat
    pub async fn rename(&self, public_id: &str, title: &str) -> ChatResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE chats SET title = ?, updated_at = ? WHERE public_id = ? AND status != 'deleted'",
        )
        .bind(title)
        .bind(&now)
        .bind(public_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ChatError::ChatNotFound);
        }

        Ok(())
    }

    /// Bump the chat's activity timestamp
    pub async fn touch(&self, chat_id: i64) -> ChatResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("UPDATE chats SET updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(chat_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Soft delete a chat by setting its status to deleted
    pub async fn soft_delete(&self, public_id: &str) -> ChatResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE chats SET status = 'deleted', updated_at = ? WHERE public_id = ? AND status != 'deleted'",
        )
        .bind(&now)
        .bind(public_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ChatError::ChatNotFound);
        }

        info!(public_id = public_id, "soft deleted chat");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CreateUserRecord, MemberRole};
    use crate::migrations::run_migrations;
    use crate::repos::{MemberRepository, UserRepository};
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_chats.db");
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

    #[tokio::test]
    async fn create_and_find_chat() {
        let (pool, _temp_dir) = create_test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let repo = ChatRepository::new(pool);

        let created = repo
            .create(alice, Some("Weekend plans"), ChatType::Group)
            .await
            .unwrap();

        let found = repo.find_by_public_id(&created.public_id).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.title.as_deref(), Some("Weekend plans"));
        assert_eq!(found.chat_type, ChatType::Group);
    }

    #[tokio::test]
    async fn find_for_user_only_returns_memberships() {
        let (pool, _temp_dir) = create_test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;

        let chats = ChatRepository::new(pool.clone());
        let members = MemberRepository::new(pool);

        let mine = chats.create(alice, Some("Mine"), ChatType::Group).await.unwrap();
        members.add(mine.id, alice, MemberRole::Owner).await.unwrap();

        let theirs = chats.create(bob, Some("Theirs"), ChatType::Group).await.unwrap();
        members.add(theirs.id, bob, MemberRole::Owner).await.unwrap();

        let listed = chats.find_for_user(alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
        assert_eq!(listed[0].member_count, 1);
    }

    #[tokio::test]
    async fn find_direct_between_matches_either_order() {
        let (pool, _temp_dir) = create_test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;

        let chats = ChatRepository::new(pool.clone());
        let members = MemberRepository::new(pool);

        let direct = chats.create(alice, None, ChatType::Direct).await.unwrap();
        members.add(direct.id, alice, MemberRole::Member).await.unwrap();
        members.add(direct.id, bob, MemberRole::Member).await.unwrap();

        let ab = chats.find_direct_between(alice, bob).await.unwrap().unwrap();
        let ba = chats.find_direct_between(bob, alice).await.unwrap().unwrap();
        assert_eq!(ab.id, direct.id);
        assert_eq!(ba.id, direct.id);
    }

    #[tokio::test]
    async fn soft_deleted_chats_are_hidden() {
        let (pool, _temp_dir) = create_test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let repo = ChatRepository::new(pool);

        let chat = repo.create(alice, Some("Doomed"), ChatType::Group).await.unwrap();
        repo.soft_delete(&chat.public_id).await.unwrap();

        assert!(repo.find_by_public_id(&chat.public_id).await.unwrap().is_none());
        assert!(matches!(
            repo.soft_delete(&chat.public_id).await,
            Err(ChatError::ChatNotFound)
        ));
    }

    #[tokio::test]
    async fn rename_updates_title() {
        let (pool, _temp_dir) = create_test_pool().await;
        let alice = create_user(&pool, "alice").await;
        let repo = ChatRepository::new(pool);

        let chat = repo.create(alice, Some("Old"), ChatType::Group).await.unwrap();
        repo.rename(&chat.public_id, "New").await.unwrap();

        let reloaded = repo.find_by_public_id(&chat.public_id).await.unwrap().unwrap();
        assert_eq!(reloaded.title.as_deref(), Some("New"));
    }
}
