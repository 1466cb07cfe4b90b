//! Shell configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use timekeep_auth::authorize::{DEFAULT_LANDING_PATH, DEFAULT_LOGIN_PATH};
use timekeep_auth::{AccessGuard, MockVerifier};

pub const SESSION_FILE_ENV: &str = "TIMEKEEP_SESSION_FILE";
pub const LOGIN_PATH_ENV: &str = "TIMEKEEP_LOGIN_PATH";
pub const LOGIN_LATENCY_ENV: &str = "TIMEKEEP_LOGIN_LATENCY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// File holding the persisted session slot.
    pub session_file: PathBuf,
    /// Login entry point carried by redirects.
    pub login_path: String,
    /// Default destination after login.
    pub landing_path: String,
    /// Simulated verifier round trip.
    pub login_latency: Duration,
}

impl ShellConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or invalid values fall
    /// back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let session_file = lookup(SESSION_FILE_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_session_file);

        let login_path = match lookup(LOGIN_PATH_ENV) {
            Some(path) if path.starts_with('/') => path,
            Some(path) => {
                tracing::warn!(value = %path, "{LOGIN_PATH_ENV} must start with '/'; using default");
                DEFAULT_LOGIN_PATH.to_string()
            }
            None => DEFAULT_LOGIN_PATH.to_string(),
        };

        let login_latency = match lookup(LOGIN_LATENCY_ENV).map(|v| v.trim().parse::<u64>()) {
            Some(Ok(ms)) => Duration::from_millis(ms),
            Some(Err(err)) => {
                tracing::warn!(error = %err, "invalid {LOGIN_LATENCY_ENV}; using default");
                MockVerifier::DEFAULT_LATENCY
            }
            None => MockVerifier::DEFAULT_LATENCY,
        };

        Self {
            session_file,
            login_path,
            landing_path: DEFAULT_LANDING_PATH.to_string(),
            login_latency,
        }
    }

    pub fn guard(&self) -> AccessGuard {
        AccessGuard::new(self.login_path.clone(), self.landing_path.clone())
    }

    pub fn verifier(&self) -> MockVerifier {
        MockVerifier::reference().with_latency(self.login_latency)
    }
}

/// `<data dir>/timekeep/session.json`, or a relative path when the platform
/// reports no data directory.
fn default_session_file() -> PathBuf {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .unwrap_or_else(|| PathBuf::from("."));

    base.join("timekeep").join("session.json")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ShellConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ShellConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]);
        assert_eq!(cfg.login_path, "/login");
        assert_eq!(cfg.landing_path, "/dashboard");
        assert_eq!(cfg.login_latency, Duration::from_millis(1000));
        assert!(cfg.session_file.ends_with("timekeep/session.json"));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config(&[
            (SESSION_FILE_ENV, "/tmp/tk/session.json"),
            (LOGIN_PATH_ENV, "/sign-in"),
            (LOGIN_LATENCY_ENV, "0"),
        ]);
        assert_eq!(cfg.session_file, PathBuf::from("/tmp/tk/session.json"));
        assert_eq!(cfg.guard().login_path(), "/sign-in");
        assert_eq!(cfg.verifier().latency(), Duration::ZERO);
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = config(&[(LOGIN_PATH_ENV, "sign-in"), (LOGIN_LATENCY_ENV, "soon")]);
        assert_eq!(cfg.login_path, "/login");
        assert_eq!(cfg.login_latency, MockVerifier::DEFAULT_LATENCY);
    }
}
