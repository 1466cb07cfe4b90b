//! Credential verification seam.
//!
//! A real deployment replaces [`MockVerifier`] with a network-backed
//! implementation returning the same `AuthResult<UserRecord>` shape.

use std::future::Future;
use std::time::Duration;

use timekeep_core::{AuthError, AuthResult, UserId, UserRecord, UserRole};

use crate::Credentials;

/// Verifies a credential pair and resolves the matching user.
pub trait CredentialVerifier {
    fn verify(&self, credentials: &Credentials) -> impl Future<Output = AuthResult<UserRecord>>;
}

/// One literal-match entry of the mock account table.
#[derive(Debug, Clone)]
pub struct MockAccount {
    identifier: String,
    secret: String,
    user: UserRecord,
}

impl MockAccount {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>, user: UserRecord) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            user,
        }
    }

    fn matches(&self, credentials: &Credentials) -> bool {
        self.identifier == credentials.identifier() && self.secret == credentials.secret()
    }
}

/// Fixed-table verifier that simulates a round trip with a bounded delay.
#[derive(Debug, Clone)]
pub struct MockVerifier {
    accounts: Vec<MockAccount>,
    latency: Duration,
}

impl MockVerifier {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);

    pub fn new(accounts: Vec<MockAccount>) -> Self {
        Self {
            accounts,
            latency: Self::DEFAULT_LATENCY,
        }
    }

    /// The demo table: one admin and one employee, both with secret `password`.
    pub fn reference() -> Self {
        let accounts = [
            ("1", "John Doe", "admin@example.com", UserRole::Admin),
            ("2", "Jane Smith", "employee@example.com", UserRole::Employee),
        ]
        .into_iter()
        .filter_map(|(id, name, email, role)| {
            let user = UserRecord::new(UserId::new(id).ok()?, name, email, role);
            Some(MockAccount::new(email, "password", user))
        })
        .collect();

        Self::new(accounts)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for MockVerifier {
    fn default() -> Self {
        Self::reference()
    }
}

impl CredentialVerifier for MockVerifier {
    async fn verify(&self, credentials: &Credentials) -> AuthResult<UserRecord> {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }

        self.accounts
            .iter()
            .find(|account| account.matches(credentials))
            .map(|account| account.user.clone())
            .ok_or(AuthError::InvalidCredentials)
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(target_arch = "wasm32")]
async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> MockVerifier {
        MockVerifier::reference().with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn reference_table_resolves_roles() {
        let verifier = instant();

        let admin = verifier
            .verify(&Credentials::new("admin@example.com", "password"))
            .await
            .unwrap();
        assert_eq!(admin.role(), UserRole::Admin);
        assert_eq!(admin.email(), "admin@example.com");

        let employee = verifier
            .verify(&Credentials::new("employee@example.com", "password"))
            .await
            .unwrap();
        assert_eq!(employee.role(), UserRole::Employee);
        assert_ne!(admin.id(), employee.id());
    }

    #[tokio::test]
    async fn match_is_literal() {
        let verifier = instant();
        for (identifier, secret) in [
            ("admin@example.com", "Password"),
            ("ADMIN@example.com", "password"),
            (" admin@example.com", "password"),
            ("user@example.com", "password"),
            ("", ""),
        ] {
            let result = verifier.verify(&Credentials::new(identifier, secret)).await;
            assert_eq!(result, Err(AuthError::InvalidCredentials), "{identifier:?}/{secret:?}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn latency_is_simulated() {
        let verifier = MockVerifier::reference();
        assert_eq!(verifier.latency(), MockVerifier::DEFAULT_LATENCY);

        let started = tokio::time::Instant::now();
        verifier
            .verify(&Credentials::new("admin@example.com", "password"))
            .await
            .unwrap();
        assert!(started.elapsed() >= MockVerifier::DEFAULT_LATENCY);
    }
}
