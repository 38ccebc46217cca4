//! Google OAuth authentication for cell-clip
//!
//! Provides PKCE generation, the out-of-band authorization code flow, token
//! exchange/refresh, and token file storage. This crate is a standalone
//! library with no dependency on the CLI binary; every path and endpoint is
//! passed in explicitly.
//!
//! Token flow:
//! 1. `Credentials::load()` reads the client id and secret
//! 2. `Authenticator::authorized_client()` calls `TokenStore::load()`
//! 3. A valid token is used as is; an expired one is refreshed and saved
//! 4. Otherwise `AuthorizationFlow::run()` prompts for a code and exchanges it
//! 5. `AuthorizedClient` attaches the bearer token and refreshes it on expiry

pub mod client;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod flow;
mod fs;
pub mod pkce;
pub mod store;
pub mod token;

pub use client::{AuthorizedClient, Authenticator};
pub use config::{AuthPaths, OAuthConfig};
pub use constants::*;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use flow::{AuthorizationFlow, CodePrompt, TerminalPrompt};
pub use pkce::{build_authorization_url, compute_challenge, generate_state, generate_verifier};
pub use store::{TokenState, TokenStore, remove_token_file};
pub use token::{Token, TokenResponse, exchange_code, refresh_token};
