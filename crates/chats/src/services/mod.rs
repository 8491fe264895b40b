//! Domain services for chats, members, and messages

pub mod chat_service;
pub mod member_service;
pub mod message_service;

pub use chat_service::{ChatService, ChatSummary, CreateGroupChat};
pub use member_service::MemberService;
pub use message_service::MessageService;
