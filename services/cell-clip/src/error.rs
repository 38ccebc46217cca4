//! Errors from reading a cell through the Sheets API

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] sheets_auth::Error),

    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid Sheets API response: {0}")]
    InvalidResponse(String),

    #[error("invalid Sheets API URL: {0}")]
    InvalidUrl(String),
}

/// Result alias using the Sheets Error
pub type Result<T> = std::result::Result<T, Error>;
