//! User entity definitions

use serde::{Deserialize, Serialize};

/// User entity representing an account in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub public_id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: UserStatus,
    pub created_at: String,
    pub updated_at: String,
    pub last_seen_at: Option<String>,
}

/// Record for inserting a new user row
#[derive(Debug, Clone)]
pub struct CreateUserRecord {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
}

/// User status enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Suspended,
    Deleted,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Suspended => "suspended",
            UserStatus::Deleted => "deleted",
        }
    }
}

impl From<&str> for UserStatus {
    fn from(s: &str) -> Self {
        match s {
            "suspended" => UserStatus::Suspended,
            "deleted" => UserStatus::Deleted,
            _ => UserStatus::Active,
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        assert_eq!(UserStatus::from("active"), UserStatus::Active);
        assert_eq!(UserStatus::from("suspended"), UserStatus::Suspended);
        assert_eq!(UserStatus::from("deleted"), UserStatus::Deleted);
        assert_eq!(UserStatus::from("unknown"), UserStatus::Active);

        assert_eq!(UserStatus::Active.to_string(), "active");
        assert_eq!(UserStatus::Suspended.to_string(), "suspended");
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            public_id: "u1".to_string(),
            email: "a@example.com".to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            avatar_url: None,
            password_hash: "secret-hash".to_string(),
            status: UserStatus::Active,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            last_seen_at: None,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }
}
