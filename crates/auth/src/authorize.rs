//! Route guarding derived from the session.
//!
//! - No IO
//! - No panics
//! - Never waits: an unsettled session yields [`AccessDecision::Pending`]

use serde::Serialize;
use tokio::sync::watch;

use timekeep_core::UserRole;

use crate::navigation::{self, NavigationEntry};
use crate::session::{Session, SessionStatus};

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";

/// Where to send an unauthenticated request, and where to return afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub login_path: String,
    pub return_to: String,
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    /// Session not settled yet: render a placeholder, do not redirect.
    Pending,
    Admit,
    Redirect(Redirect),
}

/// Gatekeeper for protected views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGuard {
    login_path: String,
    landing_path: String,
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_PATH, DEFAULT_LANDING_PATH)
    }
}

impl AccessGuard {
    pub fn new(login_path: impl Into<String>, landing_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            landing_path: landing_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Decide whether `requested_path` may render for `session`.
    ///
    /// Must be called on every navigation; the result is never cached.
    pub fn authorize(&self, session: &Session, requested_path: &str) -> AccessDecision {
        match session.status() {
            SessionStatus::Loading => AccessDecision::Pending,
            SessionStatus::Authenticated => AccessDecision::Admit,
            SessionStatus::Unauthenticated => AccessDecision::Redirect(Redirect {
                login_path: self.login_path.clone(),
                return_to: requested_path.to_string(),
            }),
        }
    }

    /// Navigation entries for `role`.
    pub fn visible_navigation(&self, role: UserRole) -> Vec<&'static NavigationEntry> {
        navigation::visible_navigation(role)
    }

    /// Where to go after a successful login.
    ///
    /// Falls back to the landing page when nothing was carried, or when the
    /// carried path is the login page itself.
    pub fn landing_path<'a>(&'a self, return_to: Option<&'a str>) -> &'a str {
        match return_to {
            Some(path) if !path.is_empty() && path != self.login_path => path,
            _ => &self.landing_path,
        }
    }
}

/// Join a location's path, query and fragment into the path a redirect
/// carries, so `?query` and `#fragment` survive the round trip through login.
///
/// `search` and `hash` may be given with or without their leading `?`/`#`.
pub fn requested_path(pathname: &str, search: &str, hash: &str) -> String {
    let search = search.strip_prefix('?').unwrap_or(search);
    let hash = hash.strip_prefix('#').unwrap_or(hash);

    let mut path = String::with_capacity(pathname.len() + search.len() + hash.len() + 2);
    path.push_str(pathname);
    if !search.is_empty() {
        path.push('?');
        path.push_str(search);
    }
    if !hash.is_empty() {
        path.push('#');
        path.push_str(hash);
    }
    path
}

/// Authorization state of one mounted view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardState {
    Pending,
    Admitted,
    Redirected,
}

/// A protected view that re-evaluates the guard on every session change.
///
/// Starts `Pending`; moves between `Admitted` and `Redirected` as the session
/// settles, logs in, or logs out. A login in flight yields a `Pending`
/// decision without leaving the current state.
#[derive(Debug, Clone)]
pub struct GuardedView {
    path: String,
    state: GuardState,
}

impl GuardedView {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: GuardState::Pending,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Re-run the guard against `session` and record the transition.
    pub fn evaluate(&mut self, guard: &AccessGuard, session: &Session) -> AccessDecision {
        let decision = guard.authorize(session, &self.path);
        let next = match &decision {
            AccessDecision::Pending => self.state,
            AccessDecision::Admit => GuardState::Admitted,
            AccessDecision::Redirect(_) => GuardState::Redirected,
        };

        if next != self.state {
            tracing::debug!(path = %self.path, from = ?self.state, to = ?next, "guard transition");
            self.state = next;
        }
        decision
    }

    /// Wait for the next session change and re-evaluate.
    ///
    /// Returns `None` once the session store has been closed.
    pub async fn follow(
        &mut self,
        guard: &AccessGuard,
        sessions: &mut watch::Receiver<Session>,
    ) -> Option<AccessDecision> {
        sessions.changed().await.ok()?;
        let session = sessions.borrow_and_update().clone();
        Some(self.evaluate(guard, &session))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use timekeep_core::{UserId, UserRecord};

    use super::*;

    fn admin() -> UserRecord {
        UserRecord::new(UserId::new("1").unwrap(), "John Doe", "admin@example.com", UserRole::Admin)
    }

    #[test]
    fn loading_session_is_pending() {
        let guard = AccessGuard::default();
        assert_eq!(guard.authorize(&Session::loading(), "/dashboard"), AccessDecision::Pending);
    }

    #[test]
    fn landing_path_prefers_carried_path() {
        let guard = AccessGuard::default();
        assert_eq!(guard.landing_path(Some("/dashboard/profile")), "/dashboard/profile");
        assert_eq!(guard.landing_path(None), "/dashboard");
        assert_eq!(guard.landing_path(Some("")), "/dashboard");
        assert_eq!(guard.landing_path(Some("/login")), "/dashboard");
    }

    #[test]
    fn custom_login_path_is_carried() {
        let guard = AccessGuard::new("/auth/sign-in", "/home");
        let decision = guard.authorize(&Session::unauthenticated(), "/home/settings");
        assert_eq!(
            decision,
            AccessDecision::Redirect(Redirect {
                login_path: "/auth/sign-in".into(),
                return_to: "/home/settings".into(),
            })
        );
        assert_eq!(guard.login_path(), "/auth/sign-in");
    }

    #[test]
    fn requested_path_keeps_query_and_fragment() {
        assert_eq!(requested_path("/dashboard/reports", "", ""), "/dashboard/reports");
        assert_eq!(
            requested_path("/dashboard/reports", "?week=42", "#totals"),
            "/dashboard/reports?week=42#totals"
        );
        assert_eq!(
            requested_path("/dashboard/reports", "week=42", "totals"),
            "/dashboard/reports?week=42#totals"
        );
        assert_eq!(requested_path("/dashboard", "?", "#"), "/dashboard");

        let guard = AccessGuard::default();
        let target = requested_path("/dashboard/timesheet", "?day=mon", "");
        assert_eq!(
            guard.authorize(&Session::unauthenticated(), &target),
            AccessDecision::Redirect(Redirect {
                login_path: "/login".into(),
                return_to: "/dashboard/timesheet?day=mon".into(),
            })
        );
        assert_eq!(guard.landing_path(Some(target.as_str())), "/dashboard/timesheet?day=mon");
    }

    #[test]
    fn view_walks_the_state_machine() {
        let guard = AccessGuard::default();
        let mut view = GuardedView::new("/dashboard/settings");
        assert_eq!(view.state(), GuardState::Pending);

        view.evaluate(&guard, &Session::loading());
        assert_eq!(view.state(), GuardState::Pending);

        view.evaluate(&guard, &Session::authenticated(admin()));
        assert_eq!(view.state(), GuardState::Admitted);

        let decision = view.evaluate(&guard, &Session::unauthenticated());
        assert_eq!(view.state(), GuardState::Redirected);
        assert!(matches!(decision, AccessDecision::Redirect(r) if r.return_to == "/dashboard/settings"));

        // A login in flight keeps the last settled state.
        assert_eq!(view.evaluate(&guard, &Session::loading()), AccessDecision::Pending);
        assert_eq!(view.state(), GuardState::Redirected);

        view.evaluate(&guard, &Session::authenticated(admin()));
        assert_eq!(view.state(), GuardState::Admitted);
    }

    #[test]
    fn decisions_serialize_tagged() {
        let value = serde_json::to_value(AccessDecision::Redirect(Redirect {
            login_path: "/login".into(),
            return_to: "/dashboard".into(),
        }))
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "decision": "redirect", "login_path": "/login", "return_to": "/dashboard" })
        );
    }

    proptest! {
        /// Property: settled sessions get the same answer for every path, and
        /// redirects carry the path unchanged.
        #[test]
        fn decision_depends_only_on_status(path in ".*") {
            let guard = AccessGuard::default();

            prop_assert_eq!(guard.authorize(&Session::authenticated(admin()), &path), AccessDecision::Admit);
            prop_assert_eq!(
                guard.authorize(&Session::unauthenticated(), &path),
                AccessDecision::Redirect(Redirect { login_path: "/login".into(), return_to: path.clone() })
            );
        }
    }
}
