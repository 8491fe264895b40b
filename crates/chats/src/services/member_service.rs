//! Member service for managing chat participation.

use parley_database::{
    Chat, ChatError, ChatMember, ChatMemberProfile, ChatRepository, ChatResult, MemberRepository,
    MemberRole, UserRepository,
};
use sqlx::SqlitePool;
use tracing::info;

/// Service for chat membership operations
pub struct MemberService {
    chats: ChatRepository,
    members: MemberRepository,
    users: UserRepository,
}

impl MemberService {
    /// Create a new member service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            chats: ChatRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// List the members of a chat the caller belongs to
    pub async fn members(
        &self,
        user_id: i64,
        chat_public_id: &str,
    ) -> ChatResult<Vec<ChatMemberProfile>> {
        let (chat, _member) = self.require_member(chat_public_id, user_id).await?;
        self.members.find_by_chat(chat.id).await
    }

    /// Add a user to a group chat. Owners and admins only.
    pub async fn add(
        &self,
        user_id: i64,
        chat_public_id: &str,
        new_member_public_id: &str,
    ) -> ChatResult<ChatMemberProfile> {
        let (chat, member) = self.require_member(chat_public_id, user_id).await?;

        if !chat.is_group() {
            return Err(ChatError::InvalidInput(
                "members cannot be added to a direct chat".to_string(),
            ));
        }
        if !member.role.can_manage() {
            return Err(ChatError::AccessDenied);
        }

        let new_member = self
            .users
            .find_by_public_id(new_member_public_id)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?
            .ok_or(ChatError::UserNotFound)?;

        let added = self.members.add(chat.id, new_member.id, MemberRole::Member).await?;

        info!(
            chat_id = chat.id,
            user_id = added.user_id,
            added_by = user_id,
            "added member to chat"
        );

        self.profile_of(chat.id, added.user_id).await
    }

    /// Remove a member from a group chat.
    ///
    /// Owners and admins may remove others; every member may remove
    /// themselves (leave). The owner cannot leave their own group.
    pub async fn remove(
        &self,
        user_id: i64,
        chat_public_id: &str,
        member_public_id: &str,
    ) -> ChatResult<ChatMember> {
        let (chat, member) = self.require_member(chat_public_id, user_id).await?;

        if !chat.is_group() {
            return Err(ChatError::InvalidInput(
                "members cannot be removed from a direct chat".to_string(),
            ));
        }

        let target = self
            .users
            .find_by_public_id(member_public_id)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?
            .ok_or(ChatError::UserNotFound)?;

        let target_member = self
            .members
            .find_by_chat_and_user(chat.id, target.id)
            .await?
            .ok_or(ChatError::MemberNotFound)?;

        if target.id == user_id {
            if member.role == MemberRole::Owner {
                return Err(ChatError::InvalidInput(
                    "the owner cannot leave their own group".to_string(),
                ));
            }
        } else {
            if !member.role.can_manage() {
                return Err(ChatError::AccessDenied);
            }
            if target_member.role == MemberRole::Owner {
                return Err(ChatError::AccessDenied);
            }
        }

        self.members.remove(chat.id, target.id).await?;

        info!(
            chat_id = chat.id,
            user_id = target.id,
            removed_by = user_id,
            "removed member from chat"
        );

        Ok(target_member)
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

    /// User IDs of every member of a chat, for event fan-out
    pub async fn member_ids(&self, chat_public_id: &str) -> ChatResult<Vec<i64>> {
        let chat = self
            .chats
            .find_by_public_id(chat_public_id)
            .await?
            .ok_or(ChatError::ChatNotFound)?;

        self.members.member_ids(chat.id).await
    }

    async fn profile_of(&self, chat_id: i64, user_id: i64) -> ChatResult<ChatMemberProfile> {
        self.members
            .find_by_chat(chat_id)
            .await?
            .into_iter()
            .find(|profile| profile.user_id == user_id)
            .ok_or(ChatError::MemberNotFound)
    }
}
