//! Shared result aliases for the database layer

pub mod errors;

pub use errors::{AuthError, ChatError, DatabaseError, UserError};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type UserResult<T> = Result<T, UserError>;
pub type ChatResult<T> = Result<T, ChatError>;
pub type AuthResult<T> = Result<T, AuthError>;
