//! # Parley Chats Crate
//!
//! Business logic for conversations: opening direct chats, creating groups,
//! membership rules, and message history. The gateway layer turns the
//! results into HTTP responses and WebSocket events; persistence lives in
//! `parley-database`.

pub mod services;
pub mod utils;

pub use services::{ChatService, ChatSummary, CreateGroupChat, MemberService, MessageService};

// Re-export the error type callers match on
pub use parley_database::ChatError;
