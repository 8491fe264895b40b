//! Chat entity definitions

use serde::{Deserialize, Serialize};

/// A conversation between two or more users.
///
/// Direct chats carry no title; the client renders the other participant's
/// name instead. `member_count` and `last_message_at` are computed by the
/// repository queries, not stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub public_id: String,
    pub title: Option<String>,
    pub chat_type: ChatType,
    pub status: ChatStatus,
    pub created_by: i64,
    pub created_at: String,
    pub updated_at: String,
    pub member_count: i64,
    pub last_message_at: Option<String>,
}

impl Chat {
    pub fn is_group(&self) -> bool {
        matches!(self.chat_type, ChatType::Group)
    }
}

/// Chat type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Direct,
    Group,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Direct => "direct",
            ChatType::Group => "group",
        }
    }
}

impl From<&str> for ChatType {
    fn from(s: &str) -> Self {
        match s {
            "group" => ChatType::Group,
            _ => ChatType::Direct,
        }
    }
}

impl std::fmt::Display for ChatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chat status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Active,
    Deleted,
}

impl ChatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStatus::Active => "active",
            ChatStatus::Deleted => "deleted",
        }
    }
}

impl From<&str> for ChatStatus {
    fn from(s: &str) -> Self {
        match s {
            "deleted" => ChatStatus::Deleted,
            _ => ChatStatus::Active,
        }
    }
}

impl std::fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_type_conversion() {
        assert_eq!(ChatType::from("direct"), ChatType::Direct);
        assert_eq!(ChatType::from("group"), ChatType::Group);
        assert_eq!(ChatType::from("unknown"), ChatType::Direct);

        assert_eq!(ChatType::Direct.to_string(), "direct");
        assert_eq!(ChatType::Group.to_string(), "group");
    }

    #[test]
    fn status_conversion() {
        assert_eq!(ChatStatus::from("active"), ChatStatus::Active);
        assert_eq!(ChatStatus::from("deleted"), ChatStatus::Deleted);
        assert_eq!(ChatStatus::Active.to_string(), "active");
    }
}
