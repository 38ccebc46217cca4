//! Common error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading local configuration files
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;
