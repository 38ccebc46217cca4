//! Authenticated client factory
//!
//! [`Authenticator`] is the only entry point the rest of the application
//! needs. It resolves a usable token (stored, refreshed, or freshly
//! authorized) and wraps it in an [`AuthorizedClient`] that attaches the
//! bearer token to every request and refreshes it when it expires.

use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::flow::{AuthorizationFlow, CodePrompt};
use crate::store::TokenStore;
use crate::token::{self, Token};

/// Resolves a token for this process and builds the authorized client.
pub struct Authenticator<P> {
    store: TokenStore,
    prompt: P,
}

impl<P: CodePrompt> Authenticator<P> {
    pub fn new(store: TokenStore, prompt: P) -> Self {
        Self { store, prompt }
    }

    /// Load the stored token, refreshing it if needed, and fall back to the
    /// interactive flow when the stored token cannot be used.
    pub async fn authorized_client(mut self) -> Result<AuthorizedClient> {
        let token = self.resolve_token().await?;
        Ok(AuthorizedClient::new(self.store, token))
    }

    async fn resolve_token(&mut self) -> Result<Token> {
        match self.store.load().await {
            Ok(token) => {
                debug!("using stored token");
                Ok(token)
            }
            Err(e) if e.requires_authorization() => {
                info!(reason = %e, "no usable token, starting authorization flow");
                eprintln!("No valid token found. Starting OAuth flow...");
                self.authorize().await
            }
            Err(e) => Err(e),
        }
    }

    /// Run the authorization flow unconditionally and persist the result.
    pub async fn authorize(&mut self) -> Result<Token> {
        let token = AuthorizationFlow::new(self.store.config())
            .run(self.store.http_client(), &mut self.prompt)
            .await?;
        self.store.save_or_warn(&token).await;
        Ok(token)
    }
}

/// HTTP client that carries the bearer token.
///
/// Holds at most one live token. Before each request the token is checked
/// and, if expired, refreshed through the token store and persisted.
#[derive(Debug)]
pub struct AuthorizedClient {
    store: TokenStore,
    token: Mutex<Token>,
}

impl AuthorizedClient {
    pub fn new(store: TokenStore, token: Token) -> Self {
        Self {
            store,
            token: Mutex::new(token),
        }
    }

    /// Snapshot of the current token.
    pub async fn token(&self) -> Token {
        self.token.lock().await.clone()
    }

    /// Whether the token file holds the token this client is using.
    pub async fn is_persisted(&self) -> bool {
        let current = self.token.lock().await;
        matches!(self.store.read().await, Ok(Some(stored)) if stored == *current)
    }

    /// `Authorization` header value, refreshing the token first if expired.
    pub async fn authorization(&self) -> Result<HeaderValue> {
        let mut current = self.token.lock().await;
        if !current.is_valid_at(token::now_millis()) {
            if !current.has_refresh_token() {
                return Err(Error::TokenExpired {
                    path: self.store.path().to_path_buf(),
                });
            }
            *current = self.store.refresh(&current).await?;
        }

        let mut value = HeaderValue::from_str(&current.authorization())
            .map_err(|e| Error::Http(format!("invalid token value: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// GET `url` with the bearer token attached.
    pub async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let authorization = self.authorization().await?;
        debug!(host = url.host_str().unwrap_or_default(), "authorized GET");
        self.store
            .http_client()
            .get(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))
    }
}
