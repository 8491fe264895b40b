//! # Parley Users Crate
//!
//! Account management for the Parley messaging backend: registration and
//! login with argon2 password hashing, and opaque bearer-token sessions.
//! Persistence lives in `parley-database`; this crate holds the business
//! rules on top of it.

pub mod services;
pub mod utils;

pub use services::{RegisterUser, SessionService, UserService};

// Re-export the error types callers match on
pub use parley_database::{AuthError, UserError};
