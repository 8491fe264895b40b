//! Chat REST endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use parley_chats::{ChatSummary, CreateGroupChat};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::middleware::CurrentUser;
use crate::rest::member::MemberResponse;
use crate::rest::message::MessageResponse;
use crate::state::GatewayState;
use crate::websocket::events::ChatServerEvent;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatResponse {
    pub id: String,
    /// Group title; absent for direct chats
    pub title: Option<String>,
    pub chat_type: String,
    pub created_at: String,
    pub updated_at: String,
    pub member_count: i64,
    pub last_message_at: Option<String>,
    pub members: Vec<MemberResponse>,
    pub last_message: Option<MessageResponse>,
}

impl From<ChatSummary> for ChatResponse {
    fn from(summary: ChatSummary) -> Self {
        Self {
            id: summary.chat.public_id,
            title: summary.chat.title,
            chat_type: summary.chat.chat_type.to_string(),
            created_at: summary.chat.created_at,
            updated_at: summary.chat.updated_at,
            member_count: summary.chat.member_count,
            last_message_at: summary.chat.last_message_at,
            members: summary.members.into_iter().map(MemberResponse::from).collect(),
            last_message: summary.last_message.map(MessageResponse::from),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenDirectChatRequest {
    /// Public ID of the other participant
    pub user_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGroupChatRequest {
    pub title: String,
    /// Public IDs of the other participants (at least two)
    pub member_ids: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RenameChatRequest {
    pub title: String,
}

fn member_user_ids(summary: &ChatSummary) -> Vec<i64> {
    summary.members.iter().map(|member| member.user_id).collect()
}

#[utoipa::path(
    get,
    path = "/api/chats",
    tag = "chats",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The caller's chats, most recently active first", body = Vec<ChatResponse>),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse)
    )
)]
pub async fn list_chats(
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
) -> GatewayResult<Json<Vec<ChatResponse>>> {
    let chats = state.chat_service.list_for_user(user_id).await?;
    Ok(Json(chats.into_iter().map(ChatResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/chats/direct",
    tag = "chats",
    security(("bearer" = [])),
    request_body = OpenDirectChatRequest,
    responses(
        (status = 200, description = "Existing direct chat", body = ChatResponse),
        (status = 201, description = "Direct chat created", body = ChatResponse),
        (status = 400, description = "Invalid request", body = crate::rest::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 404, description = "User not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn open_direct_chat(
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<OpenDirectChatRequest>,
) -> GatewayResult<impl IntoResponse> {
    let (summary, created) = state
        .chat_service
        .open_direct(user_id, &payload.user_id)
        .await?;

    let recipients = member_user_ids(&summary);
    let response = ChatResponse::from(summary);

    if created {
        state
            .hub
            .publish(
                &recipients,
                &ChatServerEvent::ChatCreated {
                    chat: response.clone(),
                },
            )
            .await;
    }

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/chats/group",
    tag = "chats",
    security(("bearer" = [])),
    request_body = CreateGroupChatRequest,
    responses(
        (status = 201, description = "Group chat created", body = ChatResponse),
        (status = 400, description = "Invalid request", body = crate::rest::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 404, description = "A member was not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn create_group_chat(
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<CreateGroupChatRequest>,
) -> GatewayResult<impl IntoResponse> {
    let summary = state
        .chat_service
        .create_group(
            user_id,
            CreateGroupChat {
                title: payload.title,
                member_ids: payload.member_ids,
            },
        )
        .await?;

    let recipients = member_user_ids(&summary);
    let response = ChatResponse::from(summary);

    state
        .hub
        .publish(
            &recipients,
            &ChatServerEvent::ChatCreated {
                chat: response.clone(),
            },
        )
        .await;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/chats/{chat_id}",
    tag = "chats",
    security(("bearer" = [])),
    params(("chat_id" = String, Path, description = "Chat public ID")),
    responses(
        (status = 200, description = "Chat details", body = ChatResponse),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 403, description = "Not a member of this chat", body = crate::rest::ErrorResponse),
        (status = 404, description = "Chat not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn get_chat(
    Path(chat_id): Path<String>,
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
) -> GatewayResult<Json<ChatResponse>> {
    let summary = state.chat_service.get(user_id, &chat_id).await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    patch,
    path = "/api/chats/{chat_id}",
    tag = "chats",
    security(("bearer" = [])),
    params(("chat_id" = String, Path, description = "Chat public ID")),
    request_body = RenameChatRequest,
    responses(
        (status = 200, description = "Chat renamed", body = ChatResponse),
        (status = 400, description = "Invalid title or direct chat", body = crate::rest::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 403, description = "Only owners and admins may rename", body = crate::rest::ErrorResponse),
        (status = 404, description = "Chat not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn rename_chat(
    Path(chat_id): Path<String>,
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<RenameChatRequest>,
) -> GatewayResult<Json<ChatResponse>> {
    let summary = state
        .chat_service
        .rename(user_id, &chat_id, &payload.title)
        .await?;

    let recipients = member_user_ids(&summary);
    let response = ChatResponse::from(summary);

    state
        .hub
        .publish(
            &recipients,
            &ChatServerEvent::ChatUpdated {
                chat: response.clone(),
            },
        )
        .await;

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/chats/{chat_id}",
    tag = "chats",
    security(("bearer" = [])),
    params(("chat_id" = String, Path, description = "Chat public ID")),
    responses(
        (status = 204, description = "Chat deleted"),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 403, description = "Only the owner may delete a group", body = crate::rest::ErrorResponse),
        (status = 404, description = "Chat not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn delete_chat(
    Path(chat_id): Path<String>,
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
) -> GatewayResult<impl IntoResponse> {
    let recipients = state.chat_service.delete(user_id, &chat_id).await?;

    state
        .hub
        .publish(&recipients, &ChatServerEvent::ChatDeleted { chat_id })
        .await;

    Ok(StatusCode::NO_CONTENT)
}
