//! User search REST endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::error::GatewayResult;
use crate::middleware::CurrentUser;
use crate::rest::auth::UserResponse;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchUsersQuery {
    /// Username or display-name prefix to match
    pub search: Option<String>,
    pub limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    security(("bearer" = [])),
    params(SearchUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized", body = crate::rest::ErrorResponse)
    )
)]
pub async fn search_users(
    State(state): State<Arc<GatewayState>>,
    CurrentUser(user_id): CurrentUser,
    Query(params): Query<SearchUsersQuery>,
) -> GatewayResult<Json<Vec<UserResponse>>> {
    let query = params.search.unwrap_or_default();

    let users = state
        .user_service
        .search(user_id, &query, params.limit)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
