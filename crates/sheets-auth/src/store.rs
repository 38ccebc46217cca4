//! Token file storage and refresh
//!
//! The token file holds exactly one [`Token`]. Loading classifies it into a
//! [`TokenState`] and acts on that state: return it, refresh and persist it,
//! or report that the user has to authorize again.
//!
//! A token is only written after the exchange or refresh that produced it
//! succeeded. There is no file locking; two concurrent invocations may race
//! on the same file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::OAuthConfig;
use crate::error::{Error, Result};
use crate::fs::write_private;
use crate::token::{self, Token};

/// What a stored token allows us to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    /// No token file
    NoToken,
    /// Usable as is
    Valid(Token),
    /// Expired, but a refresh token is on hand
    ExpiredRefreshable(Token),
    /// Expired with nothing to refresh it with
    ExpiredTerminal(Token),
}

impl TokenState {
    /// Pure classification of a stored token at `now_millis`.
    pub fn classify(token: Option<Token>, now_millis: u64) -> Self {
        match token {
            None => TokenState::NoToken,
            Some(token) if token.is_valid_at(now_millis) => TokenState::Valid(token),
            Some(token) if token.has_refresh_token() => TokenState::ExpiredRefreshable(token),
            Some(token) => TokenState::ExpiredTerminal(token),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TokenState::NoToken => "no_token",
            TokenState::Valid(_) => "valid",
            TokenState::ExpiredRefreshable(_) => "expired_refreshable",
            TokenState::ExpiredTerminal(_) => "expired_terminal",
        }
    }
}

/// Loads, refreshes and persists the token file at one fixed path.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
    config: Arc<OAuthConfig>,
    http: reqwest::Client,
}

impl TokenStore {
    pub fn new(path: PathBuf, config: Arc<OAuthConfig>, http: reqwest::Client) -> Self {
        Self { path, config, http }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    /// Read the token file without judging expiry.
    ///
    /// Returns `None` if the file does not exist. A file that exists but
    /// cannot be read is `TokenUnreadable`; an unparsable file or an empty
    /// `access_token` is `TokenMalformed`.
    pub async fn read(&self) -> Result<Option<Token>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::TokenUnreadable {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        let token: Token = serde_json::from_str(&contents).map_err(|e| Error::TokenMalformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        if token.access_token.is_empty() {
            return Err(Error::TokenMalformed {
                path: self.path.clone(),
                reason: String::from("access_token is empty"),
            });
        }
        Ok(Some(token))
    }

    /// Load a usable token, refreshing and persisting it if it expired.
    pub async fn load(&self) -> Result<Token> {
        let state = TokenState::classify(self.read().await?, token::now_millis());
        debug!(path = %self.path.display(), state = state.label(), "classified stored token");

        match state {
            TokenState::NoToken => Err(Error::TokenNotFound {
                path: self.path.clone(),
            }),
            TokenState::Valid(token) => Ok(token),
            TokenState::ExpiredRefreshable(token) => self.refresh(&token).await,
            TokenState::ExpiredTerminal(_) => Err(Error::TokenExpired {
                path: self.path.clone(),
            }),
        }
    }

    /// Refresh `token` and persist the result.
    ///
    /// On failure nothing is written. A persist failure after a successful
    /// refresh is only logged: the new token is still returned.
    pub async fn refresh(&self, token: &Token) -> Result<Token> {
        info!("access token expired, refreshing");
        let refreshed = token::refresh_token(&self.http, &self.config, token)
            .await
            .inspect_err(|e| warn!(error = %e, "token refresh failed"))?;
        self.save_or_warn(&refreshed).await;
        Ok(refreshed)
    }

    /// Write `token` to the token file with owner-only permissions.
    pub async fn save(&self, token: &Token) -> Result<()> {
        let json = serde_json::to_string_pretty(token).map_err(|e| Error::Persist {
            path: self.path.clone(),
            reason: format!("serializing token: {e}"),
        })?;

        write_private(&self.path, json.as_bytes())
            .await
            .map_err(|e| Error::Persist {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        debug!(path = %self.path.display(), "persisted token");
        Ok(())
    }

    /// Save, downgrading failure to a warning. The caller keeps using the
    /// in-memory token for this invocation. Returns whether it was written.
    pub async fn save_or_warn(&self, token: &Token) -> bool {
        match self.save(token).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "token is usable for this run but could not be saved");
                false
            }
        }
    }
}

/// Delete a token file without needing client credentials (logout).
pub async fn remove_token_file(path: &Path) -> Result<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!(path = %path.display(), "removed token");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Persist {
            path: path.to_path_buf(),
            reason: format!("removing token file: {e}"),
        }),
    }
}


/// Put a non-empty directory where the store's next temp file would go, so
/// every save fails regardless of privileges.
#[cfg(test)]
pub(crate) fn block_writes(store: &TokenStore) {
    let dir = store.path().parent().unwrap();
    std::fs::create_dir_all(dir).unwrap();
    let slot = crate::fs::temp_path(dir, store.path());
    std::fs::create_dir(&slot).unwrap();
    std::fs::write(slot.join("keep"), b"").unwrap();
}
