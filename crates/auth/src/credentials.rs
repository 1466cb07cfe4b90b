//! Login credentials and login-form validation.

use thiserror::Error;

/// Minimum secret length accepted by the login form.
pub const MIN_SECRET_LEN: usize = 6;

/// An identifier/secret pair submitted for verification.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identifier: String,
    secret: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("please enter a valid email address")]
    InvalidEmail,

    #[error("password must be at least {min} characters")]
    SecretTooShort { min: usize },
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Form-level checks run before a login is attempted.
    ///
    /// These only reject input that could never be an account; whether the
    /// pair is correct is the verifier's call.
    pub fn validate(&self) -> Result<(), CredentialsError> {
        if !looks_like_email(&self.identifier) {
            return Err(CredentialsError::InvalidEmail);
        }
        if self.secret.chars().count() < MIN_SECRET_LEN {
            return Err(CredentialsError::SecretTooShort { min: MIN_SECRET_LEN });
        }
        Ok(())
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn looks_like_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
