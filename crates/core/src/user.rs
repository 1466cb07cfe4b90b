//! The authenticated user record.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Role granted to a user; drives navigation visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    /// Least-privileged role; records persisted without a role load as this.
    #[default]
    Employee,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Employee => "employee",
        }
    }
}

impl core::fmt::Display for UserRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the signed-in user.
///
/// # Invariants
/// - Immutable once constructed: fields are private and only readable.
/// - Replaced wholesale on login and cleared wholesale on logout; there is no
///   partial update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    id: UserId,
    name: String,
    email: String,
    #[serde(default)]
    role: UserRole,
}

impl UserRecord {
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
