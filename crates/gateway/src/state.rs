//! Shared application state for the gateway

use std::sync::Arc;

use parley_chats::{ChatService, MemberService, MessageService};
use parley_config::AppConfig;
use parley_users::{SessionService, UserService};
use sqlx::SqlitePool;

use crate::error::GatewayResult;
use crate::hub::ChatHub;

/// Shared application state containing all services
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection pool
    pub pool: SqlitePool,
    /// Account service
    pub user_service: Arc<UserService>,
    /// Session service
    pub session_service: Arc<SessionService>,
    /// Chat service
    pub chat_service: Arc<ChatService>,
    /// Member service
    pub member_service: Arc<MemberService>,
    /// Message service
    pub message_service: Arc<MessageService>,
    /// Real-time fan-out hub
    pub hub: ChatHub,
}

impl GatewayState {
    /// Create a new gateway state with all services initialized
    pub fn new(pool: SqlitePool, session_ttl_seconds: u64) -> Self {
        Self {
            user_service: Arc::new(UserService::new(pool.clone())),
            session_service: Arc::new(SessionService::new(pool.clone(), session_ttl_seconds)),
            chat_service: Arc::new(ChatService::new(pool.clone())),
            member_service: Arc::new(MemberService::new(pool.clone())),
            message_service: Arc::new(MessageService::new(pool.clone())),
            hub: ChatHub::new(),
            pool,
        }
    }

    /// Create gateway state from the application configuration
    pub async fn from_config(config: &AppConfig) -> GatewayResult<Self> {
        let pool = parley_database::initialize_database(&config.database).await?;
        Ok(Self::new(pool, config.auth.session_ttl_seconds))
    }
}
