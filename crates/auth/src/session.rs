//! Session store: the single owner of authentication state.
//!
//! The store publishes every state change on a `watch` channel, so any number
//! of consumers (route guards, sidebars, the login form) read the same
//! snapshot without holding a copy of the user record.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;

use timekeep_core::{AuthError, AuthResult, UserRecord, UserRole};

use crate::storage::{SessionStorage, decode_user, encode_user};
use crate::{CredentialVerifier, Credentials};

/// Derived authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Not rehydrated yet, or a login is in flight.
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Snapshot of the authentication state.
///
/// Status is never stored; it is computed from the fields on every read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    user: Option<UserRecord>,
    settled: bool,
    pending_logins: usize,
}

impl Session {
    /// A session that has not been rehydrated yet.
    pub fn loading() -> Self {
        Self::default()
    }

    pub fn authenticated(user: UserRecord) -> Self {
        Self {
            user: Some(user),
            settled: true,
            pending_logins: 0,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            user: None,
            settled: true,
            pending_logins: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        if !self.settled || self.pending_logins > 0 {
            SessionStatus::Loading
        } else if self.user.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status() == SessionStatus::Loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(UserRecord::role)
    }
}

/// Owns the session and mediates every read/write of the persisted slot.
///
/// Construct one per process and hand it to consumers by reference; dropping
/// it (or calling [`SessionStore::close`]) ends every subscription.
#[derive(Debug)]
pub struct SessionStore<S, V> {
    storage: S,
    verifier: V,
    state: watch::Sender<Session>,
    logout_epoch: AtomicU64,
}

impl<S, V> SessionStore<S, V>
where
    S: SessionStorage,
    V: CredentialVerifier,
{
    /// Create a store in the `Loading` state. Call [`rehydrate`](Self::rehydrate)
    /// before any access decision is made.
    pub fn new(storage: S, verifier: V) -> Self {
        let (state, _) = watch::channel(Session::loading());
        Self {
            storage,
            verifier,
            state,
            logout_epoch: AtomicU64::new(0),
        }
    }

    /// Create a store and rehydrate it from the slot.
    pub fn open(storage: S, verifier: V) -> Self {
        let store = Self::new(storage, verifier);
        store.rehydrate();
        store
    }

    /// Rebuild the session from the persisted slot.
    ///
    /// Always reads the slot afresh. An unreadable or malformed slot yields a
    /// logged-out session, and a malformed slot is cleared so storage and
    /// memory agree afterwards.
    ///
    /// The returned snapshot is the settled session read from the slot; a
    /// login still in flight keeps [`session`](Self::session) in `Loading`
    /// but is not reflected here.
    pub fn rehydrate(&self) -> Session {
        let user = match self.storage.load() {
            Ok(None) => None,
            Ok(Some(blob)) => match decode_user(&blob) {
                Ok(user) => Some(user),
                Err(err) => {
                    tracing::warn!(error = %err, "discarding persisted session");
                    if let Err(err) = self.storage.clear() {
                        tracing::warn!(error = %err, "failed to clear malformed session slot");
                    }
                    None
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "session slot unreadable; starting logged out");
                None
            }
        };

        match &user {
            Some(user) => {
                tracing::info!(user_id = %user.id(), role = %user.role(), "session restored")
            }
            None => tracing::debug!("no persisted session"),
        }

        self.state.send_modify(|session| {
            session.user = user;
            session.settled = true;
        });

        let mut settled = self.state.borrow().clone();
        settled.pending_logins = 0;
        settled
    }

    /// Verify `credentials`, then persist and publish the resulting user.
    ///
    /// The session reports `Loading` until this completes. On any error the
    /// previous user (or lack of one) is kept. A [`logout`](Self::logout)
    /// issued meanwhile wins: the verified user is discarded and
    /// `AuthError::Superseded` is returned.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<UserRecord> {
        let epoch = self.logout_epoch.load(Ordering::Acquire);
        let _pending = PendingLogin::begin(&self.state);

        tracing::debug!(identifier = credentials.identifier(), "verifying credentials");
        let user = match self.verifier.verify(credentials).await {
            Ok(user) => user,
            Err(err) => {
                tracing::info!(identifier = credentials.identifier(), error = %err, "login rejected");
                return Err(err);
            }
        };

        if self.logout_epoch.load(Ordering::Acquire) != epoch {
            tracing::warn!(user_id = %user.id(), "login superseded by logout; discarding");
            return Err(AuthError::Superseded);
        }

        let blob = encode_user(&user)?;
        if let Err(err) = self.storage.save(&blob) {
            tracing::warn!(user_id = %user.id(), error = %err, "failed to persist session");
            return Err(err.into());
        }

        self.state.send_modify(|session| {
            session.user = Some(user.clone());
            session.settled = true;
        });
        tracing::info!(user_id = %user.id(), role = %user.role(), "login succeeded");
        Ok(user)
    }

    /// Clear the slot and the in-memory user. Idempotent.
    pub fn logout(&self) {
        self.logout_epoch.fetch_add(1, Ordering::AcqRel);

        if let Err(err) = self.storage.clear() {
            tracing::warn!(error = %err, "failed to clear session slot");
        }

        let mut previous = None;
        self.state.send_if_modified(|session| {
            let changed = session.user.is_some() || !session.settled;
            previous = session.user.take();
            session.settled = true;
            changed
        });

        match previous {
            Some(user) => tracing::info!(user_id = %user.id(), "logged out"),
            None => tracing::debug!("logout without an active session"),
        }
    }

    /// Borrow the current snapshot. Do not hold it across an `.await`.
    pub fn session(&self) -> watch::Ref<'_, Session> {
        self.state.borrow()
    }

    /// Receive every subsequent session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Tear the store down; subscribers see their channel close.
    pub fn close(self) {
        tracing::debug!(subscribers = self.state.receiver_count(), "closing session store");
    }
}

/// Keeps the session in `Loading` for as long as a login is in flight,
/// including when the login future is dropped before completing.
struct PendingLogin<'a> {
    state: &'a watch::Sender<Session>,
}

impl<'a> PendingLogin<'a> {
    fn begin(state: &'a watch::Sender<Session>) -> Self {
        state.send_modify(|session| session.pending_logins += 1);
        Self { state }
    }
}

impl Drop for PendingLogin<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|session| session.pending_logins = session.pending_logins.saturating_sub(1));
    }
}
