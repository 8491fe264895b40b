//! Chat member REST endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use parley_database::ChatMemberProfile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::middleware::CurrentUser;
use crate::state::GatewayState;
use crate::websocket::events::ChatServerEvent;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberResponse {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub joined_at: String,
}

impl From<ChatMemberProfile> for MemberResponse {
    fn from(profile: ChatMemberProfile) -> Self {
        Self {
            user_id: profile.user_public_id,
            username: profile.username,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            role: profile.role.to_string(),
            joined_at: profile.joined_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    /// Public ID of the user to add
    pub user_id: String,
}

#[utoipa::path(
    get,
    path = "/api/chats/{chat_id}/members",
    tag = "members",
    security(("bearer" = [])),
    params(("chat_id" = String, Path, description = "Chat public ID")),
    responses(
        (status = 200, description = "Chat members", body = Vec<MemberResponse>),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 403, description = "Not a member of this chat", body = crate::rest::ErrorResponse),
        (status = 404, description = "Chat not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn list_members(
    Path(chat_id): Path<String>,
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
) -> GatewayResult<Json<Vec<MemberResponse>>> {
    let members = state.member_service.members(user_id, &chat_id).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/chats/{chat_id}/members",
    tag = "members",
    security(("bearer" = [])),
    params(("chat_id" = String, Path, description = "Chat public ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberResponse),
        (status = 400, description = "Not a group chat", body = crate::rest::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 403, description = "Only owners and admins may add members", body = crate::rest::ErrorResponse),
        (status = 404, description = "Chat or user not found", body = crate::rest::ErrorResponse),
        (status = 409, description = "Already a member", body = crate::rest::ErrorResponse)
    )
)]
pub async fn add_member(
    Path(chat_id): Path<String>,
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<AddMemberRequest>,
) -> GatewayResult<impl IntoResponse> {
    let member = state
        .member_service
        .add(user_id, &chat_id, &payload.user_id)
        .await?;

    let response = MemberResponse::from(member);

    // The freshly added member is part of the recipient list too, so their
    // other devices learn about the new chat.
    let recipients = state.member_service.member_ids(&chat_id).await?;
    state
        .hub
        .publish(
            &recipients,
            &ChatServerEvent::MemberAdded {
                chat_id: chat_id.clone(),
                member: response.clone(),
            },
        )
        .await;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/chats/{chat_id}/members/{user_id}",
    tag = "members",
    security(("bearer" = [])),
    params(
        ("chat_id" = String, Path, description = "Chat public ID"),
        ("user_id" = String, Path, description = "Public ID of the member to remove")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 400, description = "Not a group chat or owner leaving", body = crate::rest::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse),
        (status = 403, description = "Not allowed to remove this member", body = crate::rest::ErrorResponse),
        (status = 404, description = "Chat or member not found", body = crate::rest::ErrorResponse)
    )
)]
pub async fn remove_member(
    Path((chat_id, member_id)): Path<(String, String)>,
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
) -> GatewayResult<impl IntoResponse> {
    // Snapshot the recipients before removal so the removed member is told.
    let recipients = state.member_service.member_ids(&chat_id).await?;

    state
        .member_service
        .remove(user_id, &chat_id, &member_id)
        .await?;

    state
        .hub
        .publish(
            &recipients,
            &ChatServerEvent::MemberRemoved {
                chat_id,
                user_id: member_id,
            },
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}
