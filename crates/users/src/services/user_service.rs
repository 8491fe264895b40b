//! User account service

use parley_database::{CreateUserRecord, User, UserError, UserRepository, UserResult, UserStatus};
use sqlx::SqlitePool;
use tracing::info;

use crate::utils::password::{hash_password, verify_password};
use crate::utils::validation::{
    validate_display_name, validate_email, validate_password, validate_username,
};

const MAX_SEARCH_RESULTS: i64 = 25;

/// Input for registering a new account
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub avatar_url: Option<String>,
}

/// Service for account operations
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    /// Create a new user service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account
    pub async fn register(&self, input: RegisterUser) -> UserResult<User> {
        let email = input.email.trim().to_lowercase();
        let username = input.username.trim().to_lowercase();
        let display_name = input.display_name.trim().to_string();

        validate_email(&email)?;
        validate_username(&username)?;
        validate_display_name(&display_name)?;
        validate_password(&input.password)?;

        let password_hash = hash_password(&input.password)?;

        let user = self
            .users
            .create(&CreateUserRecord {
                email,
                username,
                display_name,
                password_hash,
                avatar_url: input.avatar_url,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "registered new user");
        Ok(user)
    }

    /// Authenticate by email or username plus password.
    ///
    /// Both an unknown identifier and a wrong password report
    /// `InvalidCredentials` so callers cannot probe for accounts.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> UserResult<User> {
        let identifier = identifier.trim().to_lowercase();

        let user = if identifier.contains('@') {
            self.users.find_by_email(&identifier).await?
        } else {
            self.users.find_by_username(&identifier).await?
        };

        let user = user.ok_or(UserError::InvalidCredentials)?;

        if user.status != UserStatus::Active {
            return Err(UserError::InvalidCredentials);
        }

        if !verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Fetch a user by internal ID
    pub async fn get(&self, user_id: i64) -> UserResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    /// Fetch a user by public ID
    pub async fn get_by_public_id(&self, public_id: &str) -> UserResult<User> {
        self.users
            .find_by_public_id(public_id)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    /// Search users for the chat member picker
    pub async fn search(&self, user_id: i64, query: &str, limit: Option<i64>) -> UserResult<Vec<User>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let limit = limit.unwrap_or(MAX_SEARCH_RESULTS).clamp(1, MAX_SEARCH_RESULTS);
        self.users.search(query, user_id, limit).await
    }

    /// Record user activity for presence
    pub async fn touch_last_seen(&self, user_id: i64) -> UserResult<()> {
        self.users.touch_last_seen(user_id).await
    }
}
