//! Message service for sending and reading chat history.

use parley_database::{
    ChatError, ChatMessage, ChatRepository, ChatResult, MemberRepository, MessageRepository,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::utils::validation::validate_message_content;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

/// Service for message operations
pub struct MessageService {
    chats: ChatRepository,
    members: MemberRepository,
    messages: MessageRepository,
}

impl MessageService {
    /// Create a new message service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            chats: ChatRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            messages: MessageRepository::new(pool),
        }
    }

    /// Send a message to a chat the caller belongs to.
    ///
    /// Sending bumps the chat's activity timestamp so the conversation list
    /// reorders.
    pub async fn send(
        &self,
        user_id: i64,
        chat_public_id: &str,
        content: &str,
    ) -> ChatResult<ChatMessage> {
        let chat = self.require_membership(chat_public_id, user_id).await?;

        let content = validate_message_content(content)?;
        let message = self.messages.create(chat, user_id, &content).await?;
        self.chats.touch(chat).await?;

        info!(
            chat_id = chat,
            sender_id = user_id,
            message_id = message.id,
            "message sent"
        );

        Ok(message)
    }

    /// Page through a chat's history, newest first.
    ///
    /// `before` is the public ID of a message already seen; only older
    /// messages are returned.
    pub async fn list(
        &self,
        user_id: i64,
        chat_public_id: &str,
        limit: Option<i64>,
        before: Option<&str>,
    ) -> ChatResult<Vec<ChatMessage>> {
        let chat = self.require_membership(chat_public_id, user_id).await?;

        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let before_id = match before {
            Some(public_id) => {
                let cursor = self
                    .messages
                    .find_by_public_id(public_id)
                    .await?
                    .ok_or(ChatError::MessageNotFound)?;
                if cursor.chat_id != chat {
                    return Err(ChatError::MessageNotFound);
                }
                Some(cursor.id)
            }
            None => None,
        };

        self.messages.list_for_chat(chat, limit, before_id).await
    }

    /// Edit a message's content. Senders may only edit their own messages.
    pub async fn edit(
        &self,
        user_id: i64,
        chat_public_id: &str,
        message_public_id: &str,
        content: &str,
    ) -> ChatResult<ChatMessage> {
        let chat = self.require_membership(chat_public_id, user_id).await?;
        let message = self.require_message(chat, message_public_id).await?;

        if message.sender_id != user_id {
            return Err(ChatError::AccessDenied);
        }

        let content = validate_message_content(content)?;
        self.messages.update_content(message.id, &content).await
    }

    /// Delete a message. The sender may delete their own; chat owners and
    /// admins may delete anyone's.
    pub async fn delete(
        &self,
        user_id: i64,
        chat_public_id: &str,
        message_public_id: &str,
    ) -> ChatResult<ChatMessage> {
        let chat = self.require_membership(chat_public_id, user_id).await?;
        let message = self.require_message(chat, message_public_id).await?;

        if message.sender_id != user_id {
            let member = self
                .members
                .find_by_chat_and_user(chat, user_id)
                .await?
                .ok_or(ChatError::AccessDenied)?;
            if !member.role.can_manage() {
                return Err(ChatError::AccessDenied);
            }
        }

        self.messages.soft_delete(message.id).await?;
        Ok(message)
    }

    async fn require_membership(&self, chat_public_id: &str, user_id: i64) -> ChatResult<i64> {
        let chat = self
            .chats
            .find_by_public_id(chat_public_id)
            .await?
            .ok_or(ChatError::ChatNotFound)?;

        self.members
            .find_by_chat_and_user(chat.id, user_id)
            .await?
            .ok_or(ChatError::AccessDenied)?;

        Ok(chat.id)
    }

    async fn require_message(&self, chat_id: i64, message_public_id: &str) -> ChatResult<ChatMessage> {
        let message = self
            .messages
            .find_by_public_id(message_public_id)
            .await?
            .ok_or(ChatError::MessageNotFound)?;

        if message.chat_id != chat_id || message.is_deleted() {
            return Err(ChatError::MessageNotFound);
        }

        Ok(message)
    }
}
