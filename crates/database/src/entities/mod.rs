//! Entity definitions shared across the repositories

pub mod chat;
pub mod member;
pub mod message;
pub mod session;
pub mod user;

pub use chat::{Chat, ChatStatus, ChatType};
pub use member::{ChatMember, ChatMemberProfile, MemberRole};
pub use message::ChatMessage;
pub use session::AuthSession;
pub use user::{CreateUserRecord, User, UserStatus};
