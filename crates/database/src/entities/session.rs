//! Auth session entity definitions

use serde::{Deserialize, Serialize};

/// A bearer-token session issued at login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id: i64,
    pub token: String,
    pub user_id: i64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub expires_at: String,
}

impl AuthSession {
    /// Whether the session's expiry timestamp lies in the past.
    ///
    /// An unparseable expiry is treated as expired.
    pub fn is_expired(&self) -> bool {
        match chrono::DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(expires_at) => chrono::Utc::now() >= expires_at.with_timezone(&chrono::Utc),
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_expiring_at(expires_at: String) -> AuthSession {
        AuthSession {
            id: 1,
            token: "sess_1234567890".to_string(),
            user_id: 1,
            is_active: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
            expires_at,
        }
    }

    #[test]
    fn future_expiry_is_not_expired() {
        let expires = (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339();
        assert!(!session_expiring_at(expires).is_expired());
    }

    #[test]
    fn past_expiry_is_expired() {
        let expires = (chrono::Utc::now() - chrono::Duration::hours(1)).to_rfc3339();
        assert!(session_expiring_at(expires).is_expired());
    }

    #[test]
    fn unparseable_expiry_is_expired() {
        assert!(session_expiring_at("not-a-date".to_string()).is_expired());
    }
}
