//! Chat member entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMember {
    pub id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub role: MemberRole,
    pub joined_at: String,
}

/// A membership row joined with the member's user profile, for rendering
/// participant lists without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMemberProfile {
    pub id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub user_public_id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: MemberRole,
    pub joined_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
        }
    }

    /// Whether this role may manage the chat (rename, add/remove members).
    pub fn can_manage(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }
}

impl From<&str> for MemberRole {
    fn from(s: &str) -> Self {
        match s {
            "owner" => MemberRole::Owner,
            "admin" => MemberRole::Admin,
            _ => MemberRole::Member,
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_conversion() {
        assert_eq!(MemberRole::from("owner"), MemberRole::Owner);
        assert_eq!(MemberRole::from("admin"), MemberRole::Admin);
        assert_eq!(MemberRole::from("member"), MemberRole::Member);
        assert_eq!(MemberRole::from("unknown"), MemberRole::Member);
    }

    #[test]
    fn management_roles() {
        assert!(MemberRole::Owner.can_manage());
        assert!(MemberRole::Admin.can_manage());
        assert!(!MemberRole::Member.can_manage());
    }
}
