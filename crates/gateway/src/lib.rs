//! # Parley Gateway Crate
//!
//! The API gateway for the Parley messaging backend: REST endpoints for
//! accounts, chats, members, and messages, plus the WebSocket push channel
//! that fans chat events out to connected members.
//!
//! ## Architecture
//!
//! - **rest**: HTTP API endpoints with OpenAPI documentation
//! - **websocket**: the `/ws/chat` push channel and its event types
//! - **hub**: per-user broadcast channels used for event fan-out
//! - **state**: shared application state wiring the domain services
//! - **middleware**: session-token authentication and request logging

pub mod error;
pub mod hub;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod websocket;

pub use error::{GatewayError, GatewayResult};
pub use hub::ChatHub;
pub use state::GatewayState;

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Create the main application router with all routes
pub fn create_router(state: GatewayState) -> Router {
    let state = Arc::new(state);

    let public = Router::new()
        .route("/api/health", get(rest::health::health))
        .route("/api/auth/register", post(rest::auth::register))
        .route("/api/auth/login", post(rest::auth::login));

    let protected = Router::new()
        .route("/api/auth/logout", post(rest::auth::logout))
        .route("/api/auth/me", get(rest::auth::me))
        .route("/api/users", get(rest::user::search_users))
        .route("/api/chats", get(rest::chat::list_chats))
        .route("/api/chats/direct", post(rest::chat::open_direct_chat))
        .route("/api/chats/group", post(rest::chat::create_group_chat))
        .route(
            "/api/chats/:chat_id",
            get(rest::chat::get_chat)
                .patch(rest::chat::rename_chat)
                .delete(rest::chat::delete_chat),
        )
        .route(
            "/api/chats/:chat_id/members",
            get(rest::member::list_members).post(rest::member::add_member),
        )
        .route(
            "/api/chats/:chat_id/members/:user_id",
            delete(rest::member::remove_member),
        )
        .route(
            "/api/chats/:chat_id/messages",
            get(rest::message::list_messages).post(rest::message::send_message),
        )
        .route(
            "/api/chats/:chat_id/messages/:message_id",
            axum::routing::patch(rest::message::edit_message)
                .delete(rest::message::delete_message),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let router = Router::new()
        .merge(public)
        .merge(protected)
        // The WebSocket endpoint authenticates its own token query parameter.
        .merge(websocket::create_websocket_routes())
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any),
        )
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    // Serve Swagger UI in debug builds only.
    #[cfg(debug_assertions)]
    let router = {
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    };

    router
}

#[cfg(debug_assertions)]
mod docs {
    use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
    use utoipa::{Modify, OpenApi};

    use crate::rest;

    pub struct SecurityAddon;

    impl Modify for SecurityAddon {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            if let Some(components) = openapi.components.as_mut() {
                components.add_security_scheme(
                    "bearer",
                    SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
                );
            }
        }
    }

    #[derive(OpenApi)]
    #[openapi(
        paths(
            rest::health::health,
            rest::auth::register,
            rest::auth::login,
            rest::auth::logout,
            rest::auth::me,
            rest::user::search_users,
            rest::chat::list_chats,
            rest::chat::open_direct_chat,
            rest::chat::create_group_chat,
            rest::chat::get_chat,
            rest::chat::rename_chat,
            rest::chat::delete_chat,
            rest::member::list_members,
            rest::member::add_member,
            rest::member::remove_member,
            rest::message::list_messages,
            rest::message::send_message,
            rest::message::edit_message,
            rest::message::delete_message,
        ),
        components(
            schemas(
                rest::ErrorResponse,
                rest::health::HealthResponse,
                rest::auth::RegisterRequest,
                rest::auth::LoginRequest,
                rest::auth::SessionResponse,
                rest::auth::UserResponse,
                rest::chat::ChatResponse,
                rest::chat::OpenDirectChatRequest,
                rest::chat::CreateGroupChatRequest,
                rest::chat::RenameChatRequest,
                rest::member::MemberResponse,
                rest::member::AddMemberRequest,
                rest::message::MessageResponse,
                rest::message::MessageSenderResponse,
                rest::message::SendMessageRequest,
                rest::message::EditMessageRequest,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "health", description = "Service health"),
            (name = "auth", description = "Accounts and sessions"),
            (name = "users", description = "User search"),
            (name = "chats", description = "Chat management"),
            (name = "members", description = "Chat membership"),
            (name = "messages", description = "Messages"),
        )
    )]
    pub struct ApiDoc;
}

#[cfg(debug_assertions)]
use docs::ApiDoc;
