//! Command implementations
//!
//! User-facing progress goes to stderr; only the fetched cell value is
//! written to stdout so it can be piped into a clipboard tool.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use sheets_auth::{
    AuthPaths, Authenticator, AuthorizedClient, Credentials, OAuthConfig, TerminalPrompt,
    TokenStore, remove_token_file,
};
use tracing::info;

use crate::config::{SETTINGS_FILE, Settings};
use crate::sheets::{self, SHEETS_API_BASE};

/// Timeout for token endpoint and Sheets API calls
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Load credentials and build the authenticator for this process.
async fn authenticator(paths: &AuthPaths) -> Result<Authenticator<TerminalPrompt>> {
    let credentials = Credentials::load(&paths.credentials_file()).await?;
    let config = Arc::new(OAuthConfig::google(credentials));
    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;
    let store = TokenStore::new(paths.token_file(), config, http);
    Ok(Authenticator::new(store, TerminalPrompt::new()))
}

async fn authorized_client(paths: &AuthPaths) -> Result<AuthorizedClient> {
    authenticator(paths)
        .await?
        .authorized_client()
        .await
        .context("unable to get authenticated client")
}

fn load_settings(paths: &AuthPaths) -> Result<Settings> {
    let path = paths.base_dir().join(SETTINGS_FILE);
    Settings::load(&path).context("unable to load settings")
}

/// `get <setting>`: print the cell value.
pub async fn get(paths: &AuthPaths, name: &str) -> Result<()> {
    let settings = load_settings(paths)?;
    let Some(setting) = settings.get(name) else {
        let known: Vec<&str> = settings.names().collect();
        bail!(
            "setting '{name}' not found in {SETTINGS_FILE} (available: {})",
            if known.is_empty() {
                String::from("none")
            } else {
                known.join(", ")
            }
        );
    };

    let client = authorized_client(paths).await?;
    let value = sheets::fetch_cell(&client, SHEETS_API_BASE, setting)
        .await
        .with_context(|| format!("unable to read '{name}' from the sheet"))?;

    match value {
        Some(value) => println!("{value}"),
        None => eprintln!("No data found."),
    }
    Ok(())
}

/// `list`: print setting names, one per line.
pub fn list(paths: &AuthPaths) -> Result<()> {
    let settings = load_settings(paths)?;
    if settings.is_empty() {
        eprintln!("No settings defined in {}", paths.base_dir().join(SETTINGS_FILE).display());
    }
    for name in settings.names() {
        println!("{name}");
    }
    Ok(())
}

/// `auth setup`: prompt for the OAuth client and write the credentials file.
pub async fn auth_setup(paths: &AuthPaths) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let client_id = prompt_line(&mut input, "Enter your Google OAuth 2.0 Client ID: ")?;
    let client_secret = prompt_line(&mut input, "Enter your Google OAuth 2.0 Client Secret: ")?;
    drop(input);

    let path = paths.credentials_file();
    Credentials::new(client_id, client_secret)
        .save(&path)
        .await
        .context("unable to write credentials")?;

    eprintln!("\n✓ Credentials saved to: {}", path.display());
    eprintln!("✓ You can now run 'cell-clip auth login' to authenticate with Google Sheets.");
    Ok(())
}

/// `auth login`: make sure a usable token is stored.
pub async fn auth_login(paths: &AuthPaths) -> Result<()> {
    eprintln!("Starting Google Sheets authentication...");
    let client = authorized_client(paths).await.context("authentication failed")?;

    eprintln!("✓ Authentication successful!");
    if client.is_persisted().await {
        eprintln!("✓ Token saved to: {}", paths.token_file().display());
    } else {
        eprintln!(
            "! Token could not be saved to {}; you will be asked to log in again next time.",
            paths.token_file().display()
        );
    }
    eprintln!("✓ You can now use 'cell-clip get <setting_name>' to access your sheets.");
    Ok(())
}

/// `auth logout`: remove the stored token.
pub async fn auth_logout(paths: &AuthPaths) -> Result<()> {
    let removed = remove_token_file(&paths.token_file())
        .await
        .context("unable to remove token file")?;

    if removed {
        info!("logged out");
        eprintln!("✓ Successfully logged out.");
        eprintln!("✓ You will need to run 'cell-clip auth login' before using the tool again.");
    } else {
        eprintln!("No authentication token found. You are already logged out.");
    }
    Ok(())
}

fn prompt_line<R: BufRead>(input: &mut R, label: &str) -> Result<String> {
    eprint!("{label}");
    io::stderr().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("no input provided");
    }
    Ok(line.trim().to_string())
}
