//! Explicit configuration for the authentication manager
//!
//! Nothing in this crate looks up the current user or home directory. The
//! binary resolves a base directory once and passes it in as [`AuthPaths`].

use std::path::{Path, PathBuf};

use common::Secret;

use crate::constants::{
    CREDENTIALS_FILE, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, OOB_REDIRECT_URI, SHEETS_READONLY_SCOPE,
    TOKEN_FILE,
};
use crate::credentials::Credentials;

/// Locations of the credentials and token files under one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthPaths {
    base_dir: PathBuf,
}

impl AuthPaths {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.base_dir.join(CREDENTIALS_FILE)
    }

    pub fn token_file(&self) -> PathBuf {
        self.base_dir.join(TOKEN_FILE)
    }
}

/// OAuth client configuration for one process.
///
/// Endpoints are plain fields so tests can aim them at a mock server.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Google endpoints with the read-only Sheets scope.
    pub fn google(credentials: Credentials) -> Self {
        Self {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            redirect_uri: OOB_REDIRECT_URI.to_string(),
            scopes: vec![SHEETS_READONLY_SCOPE.to_string()],
        }
    }

    /// Space-separated scope parameter value.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_rooted_at_base_dir() {
        let paths = AuthPaths::new("/home/u/.cell-clip");
        assert_eq!(
            paths.credentials_file(),
            PathBuf::from("/home/u/.cell-clip/credentials.json")
        );
        assert_eq!(
            paths.token_file(),
            PathBuf::from("/home/u/.cell-clip/token.json")
        );
    }

    #[test]
    fn google_config_uses_oob_redirect_and_readonly_scope() {
        let config = OAuthConfig::google(Credentials::new("id-123", "secret-456"));
        assert_eq!(config.client_id, "id-123");
        assert_eq!(config.client_secret.expose(), "secret-456");
        assert_eq!(config.redirect_uri, OOB_REDIRECT_URI);
        assert_eq!(config.scope(), SHEETS_READONLY_SCOPE);
        assert_eq!(config.token_url, GOOGLE_TOKEN_URL);
    }

    #[test]
    fn debug_output_hides_client_secret() {
        let config = OAuthConfig::google(Credentials::new("id-123", "secret-456"));
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-456"), "got: {debug}");
    }
}
