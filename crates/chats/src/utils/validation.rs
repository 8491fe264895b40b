//! Input validation for chat content

use parley_database::{ChatError, ChatResult};

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_MESSAGE_LEN: usize = 4_000;

/// Validate a group chat title, returning the trimmed value
pub fn validate_group_title(title: &str) -> ChatResult<String> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ChatError::InvalidInput("chat title cannot be empty".to_string()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(ChatError::InvalidInput(format!(
            "chat title too long (max {MAX_TITLE_LEN} characters)"
        )));
    }

    Ok(title.to_string())
}

/// Validate message content, returning the trimmed value
pub fn validate_message_content(content: &str) -> ChatResult<String> {
    let content = content.trim();

    if content.is_empty() {
        return Err(ChatError::InvalidInput("message cannot be empty".to_string()));
    }
    if content.len() > MAX_MESSAGE_LEN {
        return Err(ChatError::InvalidInput(format!(
            "message too long (max {MAX_MESSAGE_LEN} characters)"
        )));
    }

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_trimmed_and_bounded() {
        assert_eq!(validate_group_title("  Weekend plans  ").unwrap(), "Weekend plans");
        assert!(validate_group_title("   ").is_err());
        assert!(validate_group_title(&"x".repeat(121)).is_err());
    }

    #[test]
    fn message_content_is_trimmed_and_bounded() {
        assert_eq!(validate_message_content(" hi ").unwrap(), "hi");
        assert!(validate_message_content("").is_err());
        assert!(validate_message_content(&"x".repeat(4_001)).is_err());
    }
}
