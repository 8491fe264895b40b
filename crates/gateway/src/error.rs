//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::AuthorizationFailed(_) => StatusCode::FORBIDDEN,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::InternalError(_)
            | GatewayError::DatabaseError(_)
            | GatewayError::WebSocketError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<parley_database::UserError> for GatewayError {
    fn from(error: parley_database::UserError) -> Self {
        use parley_database::UserError;
        match error {
            UserError::UserNotFound => GatewayError::NotFound("User not found".to_string()),
            UserError::EmailAlreadyExists => {
                GatewayError::Conflict("Email already exists".to_string())
            }
            UserError::UsernameAlreadyExists => {
                GatewayError::Conflict("Username already exists".to_string())
            }
            UserError::InvalidCredentials => {
                GatewayError::AuthenticationFailed("Invalid credentials".to_string())
            }
            UserError::ValidationError(msg) => GatewayError::InvalidRequest(msg),
            UserError::PasswordHash(msg) => GatewayError::InternalError(msg),
            UserError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<parley_database::ChatError> for GatewayError {
    fn from(error: parley_database::ChatError) -> Self {
        use parley_database::ChatError;
        match error {
            ChatError::ChatNotFound => GatewayError::NotFound("Chat not found".to_string()),
            ChatError::UserNotFound => GatewayError::NotFound("User not found".to_string()),
            ChatError::MessageNotFound => GatewayError::NotFound("Message not found".to_string()),
            ChatError::MemberNotFound => GatewayError::NotFound("Member not found".to_string()),
            ChatError::MemberAlreadyExists => {
                GatewayError::Conflict("Already a member of this chat".to_string())
            }
            ChatError::AccessDenied => {
                GatewayError::AuthorizationFailed("Access denied".to_string())
            }
            ChatError::InvalidInput(msg) => GatewayError::InvalidRequest(msg),
            ChatError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<parley_database::AuthError> for GatewayError {
    fn from(error: parley_database::AuthError) -> Self {
        use parley_database::AuthError;
        match error {
            AuthError::InvalidSession => {
                GatewayError::AuthenticationFailed("Invalid session".to_string())
            }
            AuthError::SessionExpired => {
                GatewayError::AuthenticationFailed("Session expired".to_string())
            }
            AuthError::ValidationError(msg) => GatewayError::InvalidRequest(msg),
            AuthError::DatabaseError(msg) => GatewayError::DatabaseError(msg),
        }
    }
}

impl From<parley_database::DatabaseError> for GatewayError {
    fn from(error: parley_database::DatabaseError) -> Self {
        GatewayError::DatabaseError(error.to_string())
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(error: sqlx::Error) -> Self {
        GatewayError::DatabaseError(error.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::InvalidRequest(format!("JSON serialization error: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_database::{ChatError, UserError};

    #[test]
    fn domain_errors_map_to_expected_status_codes() {
        assert_eq!(
            GatewayError::from(ChatError::ChatNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::from(ChatError::AccessDenied).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GatewayError::from(ChatError::MemberAlreadyExists).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            GatewayError::from(ChatError::InvalidInput("bad".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::from(UserError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::from(UserError::EmailAlreadyExists).status_code(),
            StatusCode::CONFLICT
        );
    }
}
