//! Repository for message data access operations.

use crate::entities::ChatMessage;
use crate::types::{ChatError, ChatResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

const MESSAGE_COLUMNS: &str = "m.id, m.public_id, m.chat_id, c.public_id AS chat_public_id, m.sender_id, \
     u.public_id AS sender_public_id, u.username AS sender_username, \
     u.display_name AS sender_display_name, u.avatar_url AS sender_avatar_url, \
     m.content, m.created_at, m.updated_at, m.deleted_at";

const MESSAGE_JOINS: &str = "FROM messages m \
     JOIN chats c ON c.id = m.chat_id \
     JOIN users u ON u.id = m.sender_id";

/// Repository for message database operations
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> ChatResult<ChatMessage> {
        Ok(ChatMessage {
            id: row
                .try_get("id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            public_id: row
                .try_get("public_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            chat_id: row
                .try_get("chat_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            chat_public_id: row
                .try_get("chat_public_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            sender_id: row
                .try_get("sender_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            sender_public_id: row
                .try_get("sender_public_id")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            sender_username: row
                .try_get("sender_username")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            sender_display_name: row
                .try_get("sender_display_name")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            sender_avatar_url: row
                .try_get("sender_avatar_url")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            content: row
                .try_get("content")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            updated_at: row
                .try_get("updated_at")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
            deleted_at: row
                .try_get("deleted_at")
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?,
        })
    }

    /// Store a new message and return it with the sender profile joined in
    pub async fn create(
        &self,
        chat_id: i64,
        sender_id: i64,
        content: &str,
    ) -> ChatResult<ChatMessage> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO messages (public_id, chat_id, sender_id, content, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(chat_id)
        .bind(sender_id)
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        let message_id = result.last_insert_rowid();

        info!(
            message_id = message_id,
            public_id = %public_id,
            chat_id = chat_id,
            sender_id = sender_id,
            "created new message"
        );

        self.find_by_id(message_id)
            .await?
            .ok_or(ChatError::MessageNotFound)
    }

    async fn find_by_id(&self, id: i64) -> ChatResult<Option<ChatMessage>> {
        let row = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} {MESSAGE_JOINS} WHERE m.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// Find a message by its public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> ChatResult<Option<ChatMessage>> {
        let row = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} {MESSAGE_JOINS} WHERE m.public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// List messages for a chat, newest first, optionally only those older
    /// than the given cursor row
    pub async fn list_for_chat(
        &self,
        chat_id: i64,
        limit: i64,
        before_id: Option<i64>,
    ) -> ChatResult<Vec<ChatMessage>> {
        let rows = match before_id {
            Some(before_id) => {
                sqlx::query(&format!(
                    "SELECT {MESSAGE_COLUMNS} {MESSAGE_JOINS}
                     WHERE m.chat_id = ? AND m.deleted_at IS NULL AND m.id < ?
                     ORDER BY m.id DESC LIMIT ?"
                ))
                .bind(chat_id)
                .bind(before_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {MESSAGE_COLUMNS} {MESSAGE_JOINS}
                     WHERE m.chat_id = ? AND m.deleted_at IS NULL
                     ORDER BY m.id DESC LIMIT ?"
                ))
                .bind(chat_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        rows.iter().map(Self::from_row).collect()
    }

    /// The most recent visible message of a chat, if any
    pub async fn latest_for_chat(&self, chat_id: i64) -> ChatResult<Option<ChatMessage>> {
        let row = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} {MESSAGE_JOINS}
             WHERE m.chat_id = ? AND m.deleted_at IS NULL
             ORDER BY m.id DESC LIMIT 1"
        ))
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        row.map(|row| Self::from_row(&row)).transpose()
    }

    /// Replace a message's content, marking it edited
    pub async fn update_content(&self, id: i64, content: &str) -> ChatResult<ChatMessage> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE messages SET content = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(content)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ChatError::MessageNotFound);
        }

        self.find_by_id(id).await?.ok_or(ChatError::MessageNotFound)
    }

    /// Soft delete a message
    pub async fn soft_delete(&self, id: i64) -> ChatResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let result =
            sqlx::query("UPDATE messages SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
                .bind(&now)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ChatError::MessageNotFound);
        }

        info!(message_id = id, "soft deleted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ChatType, CreateUserRecord, MemberRole};
    use crate::migrations::run_migrations;
    use crate::repos::{ChatRepository, MemberRepository, UserRepository};
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    struct Fixture {
        pool: SqlitePool,
        chat_id: i64,
        alice: i64,
        _temp_dir: TempDir,
    }

    async fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_messages.db");
        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePool::connect(&db_url).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let alice = UserRepository::new(pool.clone())
            .create(&CreateUserRecord {
                email: "alice@example.com".to_string(),
                username: "alice".to_string(),
                display_name: "Alice".to_string(),
                password_hash: "hash".to_string(),
                avatar_url: None,
            })
            .await
            .unwrap()
            .id;

        let chat_id = ChatRepository::new(pool.clone())
            .create(alice, Some("Test"), ChatType::Group)
            .await
            .unwrap()
            .id;
        MemberRepository::new(pool.clone())
            .add(chat_id, alice, MemberRole::Owner)
            .await
            .unwrap();

        Fixture {
            pool,
            chat_id,
            alice,
            _temp_dir: temp_dir,
        }
    }

    #[tokio::test]
    async fn create_joins_sender_profile() {
        let f = fixture().await;
        let repo = MessageRepository::new(f.pool.clone());

        let message = repo.create(f.chat_id, f.alice, "hello there").await.unwrap();

        assert_eq!(message.content, "hello there");
        assert_eq!(message.sender_username, "alice");
        assert_eq!(message.sender_display_name, "Alice");
        assert!(!message.is_edited());
        assert!(!message.is_deleted());
    }

    #[tokio::test]
    async fn list_is_newest_first_with_cursor() {
        let f = fixture().await;
        let repo = MessageRepository::new(f.pool.clone());

        for i in 0..5 {
            repo.create(f.chat_id, f.alice, &format!("msg {i}")).await.unwrap();
        }

        let first_page = repo.list_for_chat(f.chat_id, 2, None).await.unwrap();
        assert_eq!(first_page.len(), 2);
        assert_eq!(first_page[0].content, "msg 4");
        assert_eq!(first_page[1].content, "msg 3");

        let cursor = first_page.last().unwrap().id;
        let second_page = repo.list_for_chat(f.chat_id, 2, Some(cursor)).await.unwrap();
        assert_eq!(second_page.len(), 2);
        assert_eq!(second_page[0].content, "msg 2");
        assert_eq!(second_page[1].content, "msg 1");
    }

    #[tokio::test]
    async fn soft_deleted_messages_are_skipped() {
        let f = fixture().await;
        let repo = MessageRepository::new(f.pool.clone());

        let keep = repo.create(f.chat_id, f.alice, "keep me").await.unwrap();
        let drop = repo.create(f.chat_id, f.alice, "drop me").await.unwrap();

        repo.soft_delete(drop.id).await.unwrap();

        let listed = repo.list_for_chat(f.chat_id, 10, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep.id);

        let latest = repo.latest_for_chat(f.chat_id).await.unwrap().unwrap();
        assert_eq!(latest.id, keep.id);

        let result = repo.soft_delete(drop.id).await;
        assert!(matches!(result, Err(ChatError::MessageNotFound)));
    }

    #[tokio::test]
    async fn update_content_marks_edited() {
        let f = fixture().await;
        let repo = MessageRepository::new(f.pool.clone());

        let message = repo.create(f.chat_id, f.alice, "tpyo").await.unwrap();
        let updated = repo.update_content(message.id, "typo").await.unwrap();

        assert_eq!(updated.content, "typo");
        assert!(updated.is_edited());
    }
}
