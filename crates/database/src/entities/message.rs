//! Message entity definitions

use serde::{Deserialize, Serialize};

/// A stored message with its sender's profile joined in.
///
/// The flattened sender columns spare the gateway a per-message user lookup
/// when rendering chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub public_id: String,
    pub chat_id: i64,
    pub chat_public_id: String,
    pub sender_id: i64,
    pub sender_public_id: String,
    pub sender_username: String,
    pub sender_display_name: String,
    pub sender_avatar_url: Option<String>,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub deleted_at: Option<String>,
}

impl ChatMessage {
    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
