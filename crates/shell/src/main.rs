//! Terminal entry point.

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use timekeep_auth::{FileStorage, SessionStore};
    use timekeep_shell::{CommandError, ShellCommand, ShellConfig};

    timekeep_observability::init();

    let command = match ShellCommand::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}\n\n{}", timekeep_shell::commands::USAGE);
            std::process::exit(2);
        }
        Err(err) => return Err(err.into()),
    };

    let config = ShellConfig::from_env();
    tracing::debug!(session_file = ?config.session_file, "starting shell");

    let store = SessionStore::open(FileStorage::new(&config.session_file), config.verifier());
    let guard = config.guard();

    let mut stdout = std::io::stdout().lock();
    let result = command
        .run(&store, &guard, &mut stdout)
        .await
        .context("command failed");

    store.close();
    result
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser build starts from `frontend::main` instead.
}
