//! Repository implementations for database access

pub mod chat_repository;
pub mod member_repository;
pub mod message_repository;
pub mod session_repository;
pub mod user_repository;

pub use chat_repository::ChatRepository;
pub use member_repository::MemberRepository;
pub use message_repository::MessageRepository;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;
