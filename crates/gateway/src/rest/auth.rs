//! Authentication REST endpoints

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use parley_database::User;
use parley_users::RegisterUser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{GatewayError, GatewayResult};
use crate::middleware::{bearer_token, CurrentUser};
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address or username
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.public_id,
            email: user.email,
            username: user.username,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: String,
    pub user: UserResponse,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid input", body = crate::rest::ErrorResponse),
        (status = 409, description = "Email or username taken", body = crate::rest::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<RegisterRequest>,
) -> GatewayResult<impl IntoResponse> {
    let user = state
        .user_service
        .register(RegisterUser {
            email: payload.email,
            username: payload.username,
            display_name: payload.display_name,
            password: payload.password,
            avatar_url: payload.avatar_url,
        })
        .await?;

    let session = state.session_service.issue(user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token: session.token,
            expires_at: session.expires_at,
            user: user.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = crate::rest::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<LoginRequest>,
) -> GatewayResult<Json<SessionResponse>> {
    let user = state
        .user_service
        .authenticate(&payload.identifier, &payload.password)
        .await?;

    let session = state.session_service.issue(user.id).await?;

    Ok(Json(SessionResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: user.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Session revoked"),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse)
    )
)]
pub async fn logout(
    State(state): State<Arc<GatewayState>>,
    _user: CurrentUser,
    headers: HeaderMap,
) -> GatewayResult<impl IntoResponse> {
    let token = bearer_token(&headers).ok_or_else(|| {
        GatewayError::AuthenticationFailed("missing authentication token".to_string())
    })?;

    state.session_service.revoke(&token).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
) -> GatewayResult<Json<UserResponse>> {
    let user = state.user_service.get(user_id).await?;
    Ok(Json(user.into()))
}
