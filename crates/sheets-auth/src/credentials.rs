//! OAuth client credentials file
//!
//! The credentials file holds the long-lived client id and secret of the
//! user's own Google Cloud OAuth client. It is written once by
//! `cell-clip auth setup` and only read afterwards.

use std::path::Path;

use common::Secret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fs::write_private;

/// Client id and secret for the OAuth application.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Secret<String>,
}

/// On-disk shape. Fields are optional so a half-filled file is reported as
/// incomplete rather than as a parse error.
#[derive(Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    client_secret: Option<Secret<String>>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
        }
    }

    /// Read and validate the credentials file.
    ///
    /// Has no side effects and can be called repeatedly; callers should load
    /// once per process and treat the result as immutable.
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::CredentialsMissing {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(Error::CredentialsMalformed {
                    path: path.to_path_buf(),
                    reason: format!("reading file: {e}"),
                });
            }
        };

        let file: CredentialsFile =
            serde_json::from_str(&contents).map_err(|e| Error::CredentialsMalformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let client_id = file.client_id.unwrap_or_default();
        let client_secret = file.client_secret.unwrap_or_else(|| Secret::new(String::new()));
        if client_id.trim().is_empty() || client_secret.expose().trim().is_empty() {
            return Err(Error::CredentialsIncomplete {
                path: path.to_path_buf(),
            });
        }

        debug!(path = %path.display(), "loaded client credentials");
        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// Write the credentials file with owner-only permissions.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if self.client_id.trim().is_empty() || self.client_secret.expose().trim().is_empty() {
            return Err(Error::CredentialsIncomplete {
                path: path.to_path_buf(),
            });
        }

        let json = serde_json::to_string_pretty(self).map_err(|e| Error::Persist {
            path: path.to_path_buf(),
            reason: format!("serializing credentials: {e}"),
        })?;

        write_private(path, json.as_bytes())
            .await
            .map_err(|e| Error::Persist {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!(path = %path.display(), "saved client credentials");
        Ok(())
    }
}
