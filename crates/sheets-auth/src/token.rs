//! OAuth tokens and the token endpoint
//!
//! Handles the two token endpoint interactions:
//! 1. Authorization code exchange (initial OAuth flow completion)
//! 2. Token refresh (expired token with a refresh token on hand)
//!
//! Both operations POST a form to `OAuthConfig::token_url` with client
//! credentials in the body.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OAuthConfig;
use crate::constants::EXPIRY_SKEW_SECS;
use crate::error::{Error, Result};

/// A bearer token as persisted in the token file.
///
/// `expiry` is a unix timestamp in milliseconds (absolute, not a delta).
/// A token without an expiry never expires.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u64>,
}

fn default_token_type() -> String {
    String::from("Bearer")
}

impl Token {
    /// Whether the token is usable at `now_millis`, allowing for clock skew.
    pub fn is_valid_at(&self, now_millis: u64) -> bool {
        !self.access_token.is_empty() && !self.is_expired_at(now_millis)
    }

    /// Expired once `now >= expiry - skew`.
    pub fn is_expired_at(&self, now_millis: u64) -> bool {
        match self.expiry {
            Some(expiry) => now_millis >= expiry.saturating_sub(EXPIRY_SKEW_SECS * 1000),
            None => false,
        }
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// `Authorization` header value.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_type", &self.token_type)
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Current time as unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Response from the token endpoint for both exchange and refresh.
///
/// `expires_in` is a delta in seconds from the response time. Google omits
/// `refresh_token` on refresh responses.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    /// Convert to a stored token. A missing or empty `refresh_token` in the
    /// response falls back to `previous_refresh`.
    pub fn into_token(self, now_millis: u64, previous_refresh: Option<String>) -> Token {
        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .or(previous_refresh);
        Token {
            access_token: self.access_token,
            refresh_token,
            token_type: self
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(default_token_type),
            expiry: self
                .expires_in
                .map(|secs| now_millis.saturating_add(secs.saturating_mul(1000))),
        }
    }
}

/// Error body returned by the token endpoint on failure.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Render an error body as `error: description`, falling back to the raw text.
fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error,
            error_description: Some(description),
        }) => format!("{error}: {description}"),
        Ok(ErrorResponse { error, .. }) => error,
        Err(_) if body.trim().is_empty() => String::from("<no body>"),
        Err(_) => body.trim().to_string(),
    }
}

/// Exchange an authorization code for a token (initial OAuth flow).
///
/// This is the second step of the PKCE flow: the user authorized in their
/// browser and pasted the code shown by Google. We send the code along with
/// the PKCE verifier to prove we initiated the flow.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
    verifier: &str,
) -> Result<Token> {
    let response = client
        .post(&config.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose().as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::ExchangeRejected(format!(
            "token endpoint returned {status}: {}",
            describe_error_body(&body)
        )));
    }

    let token_response = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::ExchangeRejected(format!("invalid token response: {e}")))?;
    debug!(
        has_refresh_token = token_response.refresh_token.is_some(),
        expires_in = ?token_response.expires_in,
        "authorization code exchanged"
    );
    Ok(token_response.into_token(now_millis(), None))
}

/// Refresh an access token using the token's refresh token.
///
/// The returned token keeps the old refresh token unless the endpoint
/// rotated it.
pub async fn refresh_token(
    client: &reqwest::Client,
    config: &OAuthConfig,
    token: &Token,
) -> Result<Token> {
    let refresh = token
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::RefreshFailed {
            reason: String::from("no refresh token available"),
            revoked: true,
        })?;

    let response = client
        .post(&config.token_url)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.expose().as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::RefreshFailed {
            reason: format!("token refresh request failed: {e}"),
            revoked: false,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        // 400 invalid_grant / 401 / 403 means the refresh token is revoked
        // or the client credentials no longer match it
        let revoked = matches!(status.as_u16(), 400 | 401 | 403);
        return Err(Error::RefreshFailed {
            reason: format!(
                "token endpoint returned {status}: {}",
                describe_error_body(&body)
            ),
            revoked,
        });
    }

    let token_response = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::RefreshFailed {
            reason: format!("invalid refresh response: {e}"),
            revoked: false,
        })?;
    debug!(
        rotated = token_response.refresh_token.is_some(),
        "access token refreshed"
    );
    Ok(token_response.into_token(now_millis(), token.refresh_token.clone()))
}
