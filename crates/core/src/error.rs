//! Authentication error model.

use thiserror::Error;

/// Result type used by the session core.
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication/session failure.
///
/// Only `InvalidCredentials`, `Storage` and `Superseded` ever reach a `login`
/// caller. `MalformedSession` is recovered during rehydration, and
/// `Unauthenticated` is expressed to views as a redirect decision.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The identifier/secret pair did not match any known account.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// A persisted session was present but could not be decoded.
    #[error("malformed session: {0}")]
    MalformedSession(String),

    /// No authenticated session exists.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The session slot could not be written.
    #[error("session storage error: {0}")]
    Storage(String),

    /// A logout was issued while this login was in flight.
    #[error("login superseded by logout")]
    Superseded,
}

impl AuthError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedSession(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether the user can simply try again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}
