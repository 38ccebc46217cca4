//! Error types for OAuth authentication operations

use std::path::PathBuf;

/// Errors from OAuth authentication operations.
///
/// Path-bearing variants carry the file that was attempted so the CLI can
/// print a single actionable line.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "credentials file not found at {}; run `cell-clip auth setup` to create it",
        path.display()
    )]
    CredentialsMissing { path: PathBuf },

    #[error("could not parse credentials file {}: {reason}", path.display())]
    CredentialsMalformed { path: PathBuf, reason: String },

    #[error(
        "client_id and client_secret must both be set in {}; run `cell-clip auth setup` to rewrite it",
        path.display()
    )]
    CredentialsIncomplete { path: PathBuf },

    #[error("secure random source unavailable: {0}")]
    EntropySource(String),

    #[error("failed to read authorization code (no input provided): {0}")]
    UserInputUnavailable(String),

    #[error("token exchange failed: {0}")]
    ExchangeRejected(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("no token stored at {}", path.display())]
    TokenNotFound { path: PathBuf },

    #[error("token file {} is malformed: {reason}", path.display())]
    TokenMalformed { path: PathBuf, reason: String },

    /// The file exists but could not be read (permissions, a directory in
    /// its place). Never answered by re-authorizing over it.
    #[error("could not read token file {}: {reason}", path.display())]
    TokenUnreadable { path: PathBuf, reason: String },

    #[error(
        "token at {} is expired and has no refresh token; run `cell-clip auth login`",
        path.display()
    )]
    TokenExpired { path: PathBuf },

    /// `revoked` is set when the token endpoint rejected the refresh grant
    /// itself, as opposed to a transport or server failure.
    #[error("token refresh failed: {reason}")]
    RefreshFailed { reason: String, revoked: bool },

    #[error("could not save {}: {reason}", path.display())]
    Persist { path: PathBuf, reason: String },
}

impl Error {
    /// Whether the stored token can only be replaced by running the
    /// interactive authorization flow again.
    pub fn requires_authorization(&self) -> bool {
        matches!(
            self,
            Error::TokenNotFound { .. }
                | Error::TokenMalformed { .. }
                | Error::TokenExpired { .. }
                | Error::RefreshFailed { revoked: true, .. }
        )
    }
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_points_at_setup() {
        let err = Error::CredentialsMissing {
            path: PathBuf::from("/home/u/.cell-clip/credentials.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/home/u/.cell-clip/credentials.json"), "got: {msg}");
        assert!(msg.contains("cell-clip auth setup"), "got: {msg}");
    }

    #[test]
    fn reauthorization_is_required_only_for_unusable_tokens() {
        let path = PathBuf::from("token.json");
        assert!(Error::TokenNotFound { path: path.clone() }.requires_authorization());
        assert!(Error::TokenExpired { path: path.clone() }.requires_authorization());
        assert!(
            Error::TokenMalformed {
                path,
                reason: "eof".into()
            }
            .requires_authorization()
        );
        assert!(
            Error::RefreshFailed {
                reason: "invalid_grant".into(),
                revoked: true
            }
            .requires_authorization()
        );

        assert!(
            !Error::RefreshFailed {
                reason: "connection reset".into(),
                revoked: false
            }
            .requires_authorization()
        );
        assert!(
            !Error::TokenUnreadable {
                path: PathBuf::from("token.json"),
                reason: "Is a directory".into()
            }
            .requires_authorization()
        );
        assert!(!Error::Http("timeout".into()).requires_authorization());
        assert!(!Error::UserInputUnavailable("eof".into()).requires_authorization());
    }
}
