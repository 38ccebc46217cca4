//! cell-clip
//!
//! Personal CLI that reads one cell from a Google Sheet:
//! 1. Resolves the config directory (credentials, token, settings)
//! 2. Authenticates with OAuth (PKCE, out-of-band code entry)
//! 3. Reads the configured cell and prints it to stdout

mod cli;
mod commands;
mod config;
mod error;
mod sheets;

use anyhow::{Context, Result};
use sheets_auth::AuthPaths;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Command, USAGE};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // LOG_LEVEL / RUST_LOG filter, human-readable output on stderr
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = match cli::parse(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(2);
        }
    };

    let base_dir = config::resolve_base_dir(cli.config_dir.as_deref())
        .context("failed to resolve config directory")?;
    debug!(base_dir = %base_dir.display(), command = ?cli.command, "starting");
    let paths = AuthPaths::new(base_dir);

    match cli.command {
        Command::Get { setting } => commands::get(&paths, &setting).await,
        Command::List => commands::list(&paths),
        Command::AuthSetup => commands::auth_setup(&paths).await,
        Command::AuthLogin => commands::auth_login(&paths).await,
        Command::AuthLogout => commands::auth_logout(&paths).await,
        Command::Help => {
            println!("{USAGE}");
            Ok(())
        }
    }
}
