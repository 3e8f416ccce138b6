//! Authentication primitives such as login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use url::Url;
use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Site URL was missing, not absolute, or not http(s).
    InvalidSiteUrl,
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSiteUrl => write!(f, "site URL must be an absolute http(s) URL"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login request for one WordPress site.
///
/// ## Invariants
/// - `site_url` is an absolute `http`/`https` URL with any trailing slash
///   removed.
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use wp_uploader::domain::LoginCredentials;
///
/// let creds =
///     LoginCredentials::try_from_parts("https://example.com/", "admin", "password").unwrap();
/// assert_eq!(creds.site_url(), "https://example.com");
/// assert_eq!(creds.username(), "admin");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    site_url: String,
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw site/username/password inputs.
    pub fn try_from_parts(
        site_url: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, LoginValidationError> {
        let site_url = normalise_site_url(site_url)?;

        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            site_url,
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Site URL as typed by the user, without a trailing slash.
    pub fn site_url(&self) -> &str {
        self.site_url.as_str()
    }

    /// Account name sent to the token endpoint.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("site_url", &self.site_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn normalise_site_url(raw: &str) -> Result<String, LoginValidationError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|_| LoginValidationError::InvalidSiteUrl)?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(LoginValidationError::InvalidSiteUrl);
    }
    Ok(trimmed.trim_end_matches('/').to_owned())
}
