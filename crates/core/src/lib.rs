//! `timekeep-core` — identity primitives shared by the session core and the shell.
//!
//! This crate contains **pure domain** types (no storage, no I/O).

pub mod error;
pub mod id;
pub mod user;

pub use error::{AuthError, AuthResult};
pub use id::UserId;
pub use user::{UserRecord, UserRole};
