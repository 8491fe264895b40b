//! Account and session services

pub mod session_service;
pub mod user_service;

pub use session_service::SessionService;
pub use user_service::{RegisterUser, UserService};
