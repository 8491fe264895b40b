//! Message REST endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use parley_database::ChatMessage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::GatewayResult;
use crate::middleware::CurrentUser;
use crate::state::GatewayState;
use crate::websocket::events::ChatServerEvent;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    pub sender: MessageSenderResponse,
    pub content: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub edited: bool,
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageSenderResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<ChatMessage> for MessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.public_id,
            chat_id: message.chat_public_id,
            sender: MessageSenderResponse {
                id: message.sender_public_id,
                username: message.sender_username,
                display_name: message.sender_display_name,
                avatar_url: message.sender_avatar_url,
            },
            content: message.content,
            created_at: message.created_at,
            edited: message.updated_at.is_some(),
            deleted: message.deleted_at.is_some(),
            updated_at: message.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditMessageRequest {
    pub content: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListMessagesQuery {
    /// Page size, clamped to 1..=100 (default 50)
    pub limit: Option<i64>,
    /// Public ID of a message already seen; only older messages are returned
    pub before: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/chats/{chat_id}/messages",
    tag = "messages",
    security(("bearer" = [])),
    params(
        ("chat_id" = String, Path, description = "Chat public ID"),
        ListMessagesQuery
    ),
    responses(
        (status = 200, description = "Messages, newest first", body = Vec<MessageResponse>),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 403, description = "Not a member of this chat", body = crate::rest::ErrorResponse),
        (status = 404, description = "Chat not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn list_messages(
    Path(chat_id): Path<String>,
    Query(params): Query<ListMessagesQuery>,
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
) -> GatewayResult<Json<Vec<MessageResponse>>> {
    let messages = state
        .message_service
        .list(user_id, &chat_id, params.limit, params.before.as_deref())
        .await?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/chats/{chat_id}/messages",
    tag = "messages",
    security(("bearer" = [])),
    params(("chat_id" = String, Path, description = "Chat public ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageResponse),
        (status = 400, description = "Invalid content", body = crate::rest::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 403, description = "Not a member of this chat", body = crate::rest::ErrorResponse),
        (status = 404, description = "Chat not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn send_message(
    Path(chat_id): Path<String>,
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<SendMessageRequest>,
) -> GatewayResult<impl IntoResponse> {
    let message = state
        .message_service
        .send(user_id, &chat_id, &payload.content)
        .await?;

    let response = MessageResponse::from(message);

    let recipients = state.member_service.member_ids(&chat_id).await?;
    state
        .hub
        .publish(
            &recipients,
            &ChatServerEvent::MessageCreated {
                chat_id: chat_id.clone(),
                message: response.clone(),
            },
        )
        .await;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    patch,
    path = "/api/chats/{chat_id}/messages/{message_id}",
    tag = "messages",
    security(("bearer" = [])),
    params(
        ("chat_id" = String, Path, description = "Chat public ID"),
        ("message_id" = String, Path, description = "Message public ID")
    ),
    request_body = EditMessageRequest,
    responses(
        (status = 200, description = "Message updated", body = MessageResponse),
        (status = 400, description = "Invalid content", body = crate::rest::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 403, description = "Only the sender may edit", body = crate::rest::ErrorResponse),
        (status = 404, description = "Message not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn edit_message(
    Path((chat_id, message_id)): Path<(String, String)>,
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<EditMessageRequest>,
) -> GatewayResult<Json<MessageResponse>> {
    let message = state
        .message_service
        .edit(user_id, &chat_id, &message_id, &payload.content)
        .await?;

    let response = MessageResponse::from(message);

    let recipients = state.member_service.member_ids(&chat_id).await?;
    state
        .hub
        .publish(
            &recipients,
            &ChatServerEvent::MessageUpdated {
                chat_id: chat_id.clone(),
                message: response.clone(),
            },
        )
        .await;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/chats/{chat_id}/messages/{message_id}",
    tag = "messages",
    security(("bearer" = [])),
    params(
        ("chat_id" = String, Path, description = "Chat public ID"),
        ("message_id" = String, Path, description = "Message public ID")
    ),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 403, description = "Not allowed to delete this message", body = crate::rest::ErrorResponse),
        (status = 404, description = "Message not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn delete_message(
    Path((chat_id, message_id)): Path<(String, String)>,
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
) -> GatewayResult<impl IntoResponse> {
    state
        .message_service
        .delete(user_id, &chat_id, &message_id)
        .await?;

    let recipients = state.member_service.member_ids(&chat_id).await?;
    state
        .hub
        .publish(
            &recipients,
            &ChatServerEvent::MessageDeleted {
                chat_id,
                message_id,
            },
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
