//! Interactive authorization code flow
//!
//! Stages: idle → awaiting user code → exchanging → authenticated or failed.
//! The flow is one-shot: `run` consumes it, and a failed run is restarted by
//! building a new flow with a fresh PKCE pair. Nothing is retried here.

use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};

use crate::config::OAuthConfig;
use crate::error::{Error, Result};
use crate::pkce::{build_authorization_url, compute_challenge, generate_state, generate_verifier};
use crate::token::{self, Token};

/// How the authorization URL reaches the user and the code comes back.
///
/// The blocking line read has no timeout. Implementations must return
/// `Ok(None)` on a closed input instead of waiting.
pub trait CodePrompt {
    /// Show the authorization URL to the user.
    fn present(&mut self, authorization_url: &str);

    /// Read one line holding the authorization code; `None` on end of input.
    fn read_code(&mut self) -> io::Result<Option<String>>;
}

/// Prompt on the controlling terminal.
///
/// Messages go to stderr so stdout stays clean for command output.
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl CodePrompt for TerminalPrompt {
    fn present(&mut self, authorization_url: &str) {
        eprintln!("Opening browser for authentication...");
        eprintln!("If the browser doesn't open automatically, please visit:\n{authorization_url}");

        if let Err(e) = webbrowser::open(authorization_url) {
            warn!(error = %e, "could not launch browser, continue with the printed URL");
        }
    }

    fn read_code(&mut self) -> io::Result<Option<String>> {
        eprint!("Enter the authorization code: ");
        io::stderr().flush()?;
        read_code_line(&mut io::stdin().lock())
    }
}

/// Read a single line, trimming surrounding whitespace. End of input and
/// blank lines both yield `None`.
pub fn read_code_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let code = line.trim();
    Ok((!code.is_empty()).then(|| code.to_string()))
}

/// One run of the authorization code flow with PKCE.
pub struct AuthorizationFlow<'a> {
    config: &'a OAuthConfig,
}

impl<'a> AuthorizationFlow<'a> {
    pub fn new(config: &'a OAuthConfig) -> Self {
        Self { config }
    }

    /// Present the authorization URL, wait for the pasted code and exchange
    /// it for a token. The returned token has not been persisted.
    pub async fn run<P>(self, http: &reqwest::Client, prompt: &mut P) -> Result<Token>
    where
        P: CodePrompt + ?Sized,
    {
        let verifier = generate_verifier()?;
        let challenge = compute_challenge(&verifier);
        let state = generate_state()?;
        let url = build_authorization_url(self.config, &state, &challenge)?;

        debug!(stage = "awaiting_user_code", "presenting authorization URL");
        prompt.present(&url);

        let code = match prompt.read_code() {
            Ok(Some(code)) => code,
            Ok(None) => {
                return Err(Error::UserInputUnavailable(String::from(
                    "input closed or empty",
                )));
            }
            Err(e) => return Err(Error::UserInputUnavailable(e.to_string())),
        };

        debug!(stage = "exchanging", "exchanging authorization code");
        let token = token::exchange_code(http, self.config, &code, &verifier)
            .await
            .inspect_err(|e| warn!(stage = "failed", error = %e, "authorization failed"))?;

        info!(stage = "authenticated", "authorization completed");
        Ok(token)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;

    use super::*;

    /// Scripted prompt: records presented URLs, replays queued answers.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompt {
        pub presented: Vec<String>,
        pub answers: VecDeque<io::Result<Option<String>>>,
    }

    impl ScriptedPrompt {
        pub fn answering(code: &str) -> Self {
            Self {
                presented: Vec::new(),
                answers: VecDeque::from([Ok(Some(code.to_string()))]),
            }
        }

        pub fn closed() -> Self {
            Self::default()
        }
    }

    impl CodePrompt for ScriptedPrompt {
        fn present(&mut self, authorization_url: &str) {
            self.presented.push(authorization_url.to_string());
        }

        fn read_code(&mut self) -> io::Result<Option<String>> {
            self.answers.pop_front().unwrap_or(Ok(None))
        }
    }
}
