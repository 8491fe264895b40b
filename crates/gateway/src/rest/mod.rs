//! REST endpoints for the gateway

pub mod auth;
pub mod chat;
pub mod health;
pub mod member;
pub mod message;
pub mod user;

use serde::Serialize;
use utoipa::ToSchema;

/// JSON error body returned by every endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
