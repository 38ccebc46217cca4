//! Google OAuth constants
//!
//! Endpoints and parameters for the installed-application flow. The client
//! id and secret are not compiled in; they come from the user's credentials
//! file.

/// Google authorization endpoint
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Token endpoint for code exchange and token refresh
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Out-of-band redirect: Google shows the code to the user instead of
/// redirecting to a listener.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Read-only access to spreadsheets
pub const SHEETS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets.readonly";

/// Directory under the home directory holding credentials, token and settings
pub const DEFAULT_DIR_NAME: &str = ".cell-clip";

pub const CREDENTIALS_FILE: &str = "credentials.json";

pub const TOKEN_FILE: &str = "token.json";

/// A token within this many seconds of its expiry is treated as expired.
pub const EXPIRY_SKEW_SECS: u64 = 10;
