//! PKCE (Proof Key for Code Exchange) implementation per RFC 7636
//!
//! Generates the code verifier and S256 challenge used during the OAuth
//! authorization flow. The verifier stays in memory for one flow run and is
//! sent during token exchange; the challenge is included in the authorization
//! URL so the authorization server can verify the exchange request came from
//! the same party that initiated the flow.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::Url;
use sha2::{Digest, Sha256};

use crate::config::OAuthConfig;
use crate::error::{Error, Result};

/// Random bytes behind each verifier (43 base64url characters).
const VERIFIER_BYTES: usize = 32;

/// Random bytes behind each `state` value.
const STATE_BYTES: usize = 16;

/// Generate a cryptographically random PKCE code verifier.
///
/// 32 bytes from the operating system CSPRNG, URL-safe base64 without
/// padding. RFC 7636 requires 43-128 characters; this yields exactly 43.
pub fn generate_verifier() -> Result<String> {
    random_url_safe(VERIFIER_BYTES, getrandom::fill)
}

/// Generate the opaque `state` value sent with the authorization request.
pub fn generate_state() -> Result<String> {
    random_url_safe(STATE_BYTES, getrandom::fill)
}

fn random_url_safe<F>(len: usize, fill: F) -> Result<String>
where
    F: FnOnce(&mut [u8]) -> std::result::Result<(), getrandom::Error>,
{
    let mut bytes = vec![0u8; len];
    fill(&mut bytes).map_err(|e| Error::EntropySource(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Compute the S256 code challenge from a verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`, hashing the encoded verifier
/// string exactly as it is later sent as `code_verifier`.
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Build the full authorization URL with all required OAuth parameters.
///
/// `access_type=offline` asks Google for a refresh token alongside the
/// access token.
pub fn build_authorization_url(config: &OAuthConfig, state: &str, challenge: &str) -> Result<String> {
    let scope = config.scope();
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("state", state),
            ("code_challenge", challenge),
            ("code_challenge_method", "S256"),
        ],
    )
    .map_err(|e| Error::Http(format!("invalid authorization endpoint {}: {e}", config.auth_url)))?;
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::constants::OOB_REDIRECT_URI;
    use crate::credentials::Credentials;

    fn is_url_safe(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    #[test]
    fn verifier_is_url_safe_base64() {
        let verifier = generate_verifier().unwrap();
        // 32 bytes → 43 base64url chars without padding
        assert_eq!(verifier.len(), 43);
        assert!(
            is_url_safe(&verifier),
            "verifier must be URL-safe base64 (no padding): {verifier}"
        );
    }

    #[test]
    fn verifiers_do_not_collide() {
        let samples: HashSet<String> = (0..1000).map(|_| generate_verifier().unwrap()).collect();
        assert_eq!(samples.len(), 1000, "verifiers must not repeat");
    }

    #[test]
    fn entropy_failure_is_reported() {
        let err = random_url_safe(VERIFIER_BYTES, |_| Err(getrandom::Error::UNSUPPORTED))
            .unwrap_err();
        assert!(matches!(err, Error::EntropySource(_)), "got {err:?}");
    }

    #[test]
    fn state_is_short_url_safe_token() {
        let state = generate_state().unwrap();
        assert_eq!(state.len(), 22);
        assert!(is_url_safe(&state));
        assert_ne!(state, generate_state().unwrap());
    }

    #[test]
    fn challenge_is_deterministic() {
        let verifier = "test-verifier-value";
        let c1 = compute_challenge(verifier);
        let c2 = compute_challenge(verifier);
        assert_eq!(c1, c2, "same verifier must produce same challenge");
    }

    #[test]
    fn challenge_matches_known_value() {
        // SHA256("hello") = 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824
        let challenge = compute_challenge("hello");
        assert_eq!(challenge, "LPJNul-wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ");
    }

    #[test]
    fn challenge_decodes_to_sha256_digest() {
        let verifier = generate_verifier().unwrap();
        let challenge = compute_challenge(&verifier);
        assert!(is_url_safe(&challenge));

        let decoded = URL_SAFE_NO_PAD.decode(&challenge).expect("valid base64url");
        assert_eq!(decoded.len(), 32, "SHA-256 hash must be 32 bytes");
    }

    #[test]
    fn authorization_url_contains_required_params() {
        let config = OAuthConfig::google(Credentials::new("client-abc", "secret"));
        let challenge = compute_challenge("test-verifier");
        let url = build_authorization_url(&config, "state-123", &challenge).unwrap();

        let parsed = Url::parse(&url).unwrap();
        assert!(url.starts_with(&config.auth_url));
        let params: HashMap<String, String> = parsed.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client-abc");
        assert_eq!(params["redirect_uri"], OOB_REDIRECT_URI);
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], config.scope());
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["state"], "state-123");
        assert_eq!(params["code_challenge"], challenge);
        assert_eq!(params["code_challenge_method"], "S256");
    }

    #[test]
    fn authorization_url_never_contains_verifier() {
        let config = OAuthConfig::google(Credentials::new("client-abc", "secret"));
        let verifier = generate_verifier().unwrap();
        let url =
            build_authorization_url(&config, "s", &compute_challenge(&verifier)).unwrap();
        assert!(!url.contains(&verifier));
    }
}
