//! Terminal shell commands.
//!
//! Each invocation is a fresh process: the store is rehydrated from the file
//! slot first, so these commands exercise persistence across restarts.

use std::io::Write;

use thiserror::Error;

use timekeep_auth::{
    AccessGuard, AuthError, CredentialVerifier, Credentials, CredentialsError, SessionStorage,
    SessionStore,
};

pub const USAGE: &str = "usage: timekeep-shell <command>

commands:
  status                            show the current session
  login <email> <password> [path]   sign in, then continue to [path]
  logout                            end the session
  open <path>                       ask the guard whether <path> may render
  nav                               list navigation for the signed-in user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Status,
    Login {
        credentials: Credentials,
        return_to: Option<String>,
    },
    Logout,
    Open {
        path: String,
    },
    Nav,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("not signed in")]
    NotSignedIn,

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ShellCommand {
    /// Parse arguments (without the program name).
    pub fn parse<I>(args: I) -> Result<Self, CommandError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(name) = args.next() else {
            return Err(CommandError::Usage("missing command".into()));
        };
        let rest: Vec<String> = args.collect();

        let command = match (name.as_str(), rest.as_slice()) {
            ("status", []) => ShellCommand::Status,
            ("logout", []) => ShellCommand::Logout,
            ("nav", []) => ShellCommand::Nav,
            ("open", [path]) => ShellCommand::Open { path: path.clone() },
            ("login", [email, password]) => ShellCommand::Login {
                credentials: Credentials::new(email.as_str(), password.as_str()),
                return_to: None,
            },
            ("login", [email, password, path]) => ShellCommand::Login {
                credentials: Credentials::new(email.as_str(), password.as_str()),
                return_to: Some(path.clone()),
            },
            ("status" | "logout" | "nav" | "open" | "login", _) => {
                return Err(CommandError::Usage(format!("wrong arguments for '{name}'")));
            }
            _ => return Err(CommandError::Usage(format!("unknown command '{name}'"))),
        };
        Ok(command)
    }

    /// Run against a rehydrated store, writing human-readable output to `out`.
    pub async fn run<S, V, W>(
        self,
        store: &SessionStore<S, V>,
        guard: &AccessGuard,
        out: &mut W,
    ) -> Result<(), CommandError>
    where
        S: SessionStorage,
        V: CredentialVerifier,
        W: Write,
    {
        match self {
            ShellCommand::Status => {
                let session = store.session();
                match session.user() {
                    Some(user) => writeln!(
                        out,
                        "signed in as {} <{}> ({})",
                        user.name(),
                        user.email(),
                        user.role()
                    )?,
                    None => writeln!(out, "not signed in")?,
                }
            }
            ShellCommand::Login {
                credentials,
                return_to,
            } => {
                credentials.validate()?;
                let user = store.login(&credentials).await?;
                writeln!(
                    out,
                    "signed in as {} ({}); continue to {}",
                    user.name(),
                    user.role(),
                    guard.landing_path(return_to.as_deref())
                )?;
            }
            ShellCommand::Logout => {
                store.logout();
                writeln!(out, "signed out")?;
            }
            ShellCommand::Open { path } => {
                let decision = guard.authorize(&store.session(), &path);
                writeln!(out, "{}", serde_json::to_string(&decision)?)?;
            }
            ShellCommand::Nav => {
                let Some(role) = store.session().role() else {
                    return Err(CommandError::NotSignedIn);
                };
                for entry in guard.visible_navigation(role) {
                    writeln!(out, "{:<16} {}", entry.label, entry.target)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use timekeep_auth::{MemoryStorage, MockVerifier};

    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    async fn run_line(
        store: &SessionStore<MemoryStorage, MockVerifier>,
        line: &str,
    ) -> Result<String, CommandError> {
        let mut out = Vec::new();
        ShellCommand::parse(args(line))?
            .run(store, &AccessGuard::default(), &mut out)
            .await?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn store() -> SessionStore<MemoryStorage, MockVerifier> {
        SessionStore::open(
            MemoryStorage::new(),
            MockVerifier::reference().with_latency(Duration::ZERO),
        )
    }

    #[test]
    fn parses_commands() {
        assert_eq!(ShellCommand::parse(args("status")).unwrap(), ShellCommand::Status);
        assert_eq!(
            ShellCommand::parse(args("open /dashboard")).unwrap(),
            ShellCommand::Open {
                path: "/dashboard".into()
            }
        );
        assert!(matches!(
            ShellCommand::parse(args("login a@example.com secret1 /dashboard/profile")).unwrap(),
            ShellCommand::Login { return_to: Some(p), .. } if p == "/dashboard/profile"
        ));
    }

    #[test]
    fn rejects_bad_invocations() {
        for line in ["", "frobnicate", "open", "login only-email", "status extra"] {
            assert!(
                matches!(ShellCommand::parse(args(line)), Err(CommandError::Usage(_))),
                "{line:?}"
            );
        }
    }

    #[tokio::test]
    async fn login_open_nav_logout() {
        let store = store();

        let out = run_line(&store, "open /dashboard/settings").await.unwrap();
        assert!(out.contains("\"decision\":\"redirect\""));
        assert!(out.contains("\"return_to\":\"/dashboard/settings\""));

        let out = run_line(&store, "login admin@example.com password /dashboard/settings")
            .await
            .unwrap();
        assert_eq!(out, "signed in as John Doe (admin); continue to /dashboard/settings\n");

        let out = run_line(&store, "open /dashboard/settings").await.unwrap();
        assert_eq!(out, "{\"decision\":\"admit\"}\n");

        let out = run_line(&store, "nav").await.unwrap();
        assert!(out.contains("Reports"));
        assert!(!out.contains("Timesheet"));

        assert_eq!(run_line(&store, "logout").await.unwrap(), "signed out\n");
        assert_eq!(run_line(&store, "status").await.unwrap(), "not signed in\n");
        assert!(matches!(run_line(&store, "nav").await, Err(CommandError::NotSignedIn)));
    }

    #[tokio::test]
    async fn form_validation_runs_before_verification() {
        let store = store();

        let err = run_line(&store, "login admin password").await.unwrap_err();
        assert!(matches!(err, CommandError::Credentials(CredentialsError::InvalidEmail)));

        let err = run_line(&store, "login admin@example.com wrongpass").await.unwrap_err();
        assert!(matches!(err, CommandError::Auth(AuthError::InvalidCredentials)));
        assert_eq!(run_line(&store, "status").await.unwrap(), "not signed in\n");
    }
}
