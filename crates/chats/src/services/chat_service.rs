//! Chat service for creating, listing, and managing conversations.

use parley_database::{
    Chat, ChatError, ChatMember, ChatMemberProfile, ChatMessage, ChatRepository, ChatResult,
    ChatType, MemberRepository, MemberRole, MessageRepository, UserRepository,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::utils::validation::validate_group_title;

/// A chat with everything the conversation list needs to render it
#[derive(Debug, Clone)]
pub struct ChatSummary {
    pub chat: Chat,
    pub members: Vec<ChatMemberProfile>,
    pub last_message: Option<ChatMessage>,
}

/// Input for creating a group chat
#[derive(Debug, Clone)]
pub struct CreateGroupChat {
    pub title: String,
    /// Public IDs of the other participants
    pub member_ids: Vec<String>,
}

/// Service for chat-level operations
pub struct ChatService {
    chats: ChatRepository,
    members: MemberRepository,
    messages: MessageRepository,
    users: UserRepository,
}

impl ChatService {
    /// Create a new chat service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            chats: ChatRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// Open the direct chat between the caller and another user, creating it
    /// if it does not exist yet. Returns the chat and whether it was created.
    pub async fn open_direct(
        &self,
        user_id: i64,
        other_public_id: &str,
    ) -> ChatResult<(ChatSummary, bool)> {
        let other = self
            .users
            .find_by_public_id(other_public_id)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?
            .ok_or(ChatError::UserNotFound)?;

        if other.id == user_id {
            return Err(ChatError::InvalidInput(
                "cannot open a direct chat with yourself".to_string(),
            ));
        }

        if let Some(existing) = self.chats.find_direct_between(user_id, other.id).await? {
            return Ok((self.assemble(existing).await?, false));
        }

        let chat = self.chats.create(user_id, None, ChatType::Direct).await?;
        self.members.add(chat.id, user_id, MemberRole::Member).await?;
        self.members.add(chat.id, other.id, MemberRole::Member).await?;

        info!(
            chat_id = chat.id,
            user_id = user_id,
            other_user_id = other.id,
            "opened new direct chat"
        );

        let chat = self.reload(&chat.public_id).await?;
        Ok((self.assemble(chat).await?, true))
    }

    /// Create a group chat with the caller as owner.
    ///
    /// A group needs at least two other participants; anything smaller is a
    /// direct chat.
    pub async fn create_group(&self, user_id: i64, input: CreateGroupChat) -> ChatResult<ChatSummary> {
        let title = validate_group_title(&input.title)?;

        let mut other_ids = Vec::new();
        for public_id in &input.member_ids {
            let user = self
                .users
                .find_by_public_id(public_id)
                .await
                .map_err(|e| ChatError::DatabaseError(e.to_string()))?
                .ok_or(ChatError::UserNotFound)?;

            if user.id != user_id && !other_ids.contains(&user.id) {
                other_ids.push(user.id);
            }
        }

        if other_ids.len() < 2 {
            return Err(ChatError::InvalidInput(
                "a group chat needs at least two other members".to_string(),
            ));
        }

        let chat = self.chats.create(user_id, Some(&title), ChatType::Group).await?;
        self.members.add(chat.id, user_id, MemberRole::Owner).await?;
        for other in &other_ids {
            self.members.add(chat.id, *other, MemberRole::Member).await?;
        }

        info!(
            chat_id = chat.id,
            user_id = user_id,
            member_count = other_ids.len() + 1,
            "created group chat"
        );

        let chat = self.reload(&chat.public_id).await?;
        self.assemble(chat).await
    }

    /// List the caller's chats, most recently active first
    pub async fn list_for_user(&self, user_id: i64) -> ChatResult<Vec<ChatSummary>> {
        let chats = self.chats.find_for_user(user_id).await?;

        let mut summaries = Vec::with_capacity(chats.len());
        for chat in chats {
            summaries.push(self.assemble(chat).await?);
        }
        Ok(summaries)
    }

    /// Fetch a single chat the caller belongs to
    pub async fn get(&self, user_id: i64, chat_public_id: &str) -> ChatResult<ChatSummary> {
        let (chat, _member) = self.require_member(chat_public_id, user_id).await?;
        self.assemble(chat).await
    }

    /// Rename a group chat
    pub async fn rename(
        &self,
        user_id: i64,
        chat_public_id: &str,
        title: &str,
    ) -> ChatResult<ChatSummary> {
        let (chat, member) = self.require_member(chat_public_id, user_id).await?;

        if !chat.is_group() {
            return Err(ChatError::InvalidInput(
                "direct chats cannot be renamed".to_string(),
            ));
        }
        if !member.role.can_manage() {
            return Err(ChatError::AccessDenied);
        }

        let title = validate_group_title(title)?;
        self.chats.rename(chat_public_id, &title).await?;

        let chat = self.reload(chat_public_id).await?;
        self.assemble(chat).await
    }

    /// Delete a chat, returning the member IDs that should be notified.
    ///
    /// Group chats may only be deleted by their owner; either participant may
    /// delete a direct chat.
    pub async fn delete(&self, user_id: i64, chat_public_id: &str) -> ChatResult<Vec<i64>> {
        let (chat, member) = self.require_member(chat_public_id, user_id).await?;

        if chat.is_group() && member.role != MemberRole::Owner {
            return Err(ChatError::AccessDenied);
        }

        let member_ids = self.members.member_ids(chat.id).await?;
        self.chats.soft_delete(chat_public_id).await?;

        Ok(member_ids)
    }

    /// Resolve a chat and the caller's membership in it
    pub async fn require_member(
        &self,
        chat_public_id: &str,
        user_id: i64,
    ) -> ChatResult<(Chat, ChatMember)> {
        let chat = self
            .chats
            .find_by_public_id(chat_public_id)
            .await?
            .ok_or(ChatError::ChatNotFound)?;

        let member = self
            .members
            .find_by_chat_and_user(chat.id, user_id)
            .await?
            .ok_or(ChatError::AccessDenied)?;

        Ok((chat, member))
    }

    async fn reload(&self, chat_public_id: &str) -> ChatResult<Chat> {
        self.chats
            .find_by_public_id(chat_public_id)
            .await?
            .ok_or(ChatError::ChatNotFound)
    }

    async fn assemble(&self, chat: Chat) -> ChatResult<ChatSummary> {
        let members = self.members.find_by_chat(chat.id).await?;
        let last_message = self.messages.latest_for_chat(chat.id).await?;

        Ok(ChatSummary {
            chat,
            members,
            last_message,
        })
    }
}
