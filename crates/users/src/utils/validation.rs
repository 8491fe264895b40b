//! Input validation for account fields

use once_cell::sync::Lazy;
use parley_database::{UserError, UserResult};
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]{3,32}$").expect("username regex is valid"));

pub const MAX_DISPLAY_NAME_LEN: usize = 64;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

pub fn validate_email(email: &str) -> UserResult<()> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err(UserError::ValidationError("invalid email address".to_string()));
    }
    Ok(())
}

/// Usernames are lowercase alphanumerics and underscores, 3-32 characters.
pub fn validate_username(username: &str) -> UserResult<()> {
    if !USERNAME_RE.is_match(username) {
        return Err(UserError::ValidationError(
            "username must be 3-32 lowercase letters, digits or underscores".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_display_name(display_name: &str) -> UserResult<()> {
    if display_name.trim().is_empty() {
        return Err(UserError::ValidationError("display name cannot be empty".to_string()));
    }
    if display_name.len() > MAX_DISPLAY_NAME_LEN {
        return Err(UserError::ValidationError(format!(
            "display name too long (max {MAX_DISPLAY_NAME_LEN} characters)"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> UserResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(UserError::ValidationError(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(UserError::ValidationError(format!(
            "password too long (max {MAX_PASSWORD_LEN} characters)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_emails() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last@sub.domain.org").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a_1").is_ok());

        assert!(validate_username("ab").is_err());
        assert!(validate_username("UPPER").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(33)).is_err());
    }

    #[test]
    fn display_name_rules() {
        assert!(validate_display_name("Alice Liddell").is_ok());
        assert!(validate_display_name("  ").is_err());
        assert!(validate_display_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }
}
