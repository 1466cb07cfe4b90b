//! `timekeep-auth` — session ownership and route guarding.
//!
//! [`SessionStore`] is the leaf: it owns the authenticated user, persists it,
//! and publishes changes. [`AccessGuard`] only reads session snapshots.
//! Neither depends on a UI toolkit or a concrete storage backend.

pub mod authorize;
pub mod credentials;
pub mod navigation;
pub mod session;
pub mod storage;
pub mod verifier;

pub use authorize::{
    AccessDecision, AccessGuard, GuardState, GuardedView, Redirect, requested_path,
};
pub use credentials::{Credentials, CredentialsError};
pub use navigation::{Audience, NAVIGATION, NavigationEntry, visible_navigation};
pub use session::{Session, SessionStatus, SessionStore};
pub use storage::{MemoryStorage, SessionStorage, StorageError};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
pub use verifier::{CredentialVerifier, MockAccount, MockVerifier};

pub use timekeep_core::{AuthError, AuthResult, UserId, UserRecord, UserRole};
