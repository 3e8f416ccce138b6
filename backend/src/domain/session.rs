//! Authenticated identity and the session that carries its credential.
//!
//! A [`Session`] is a [`User`] plus the resolved API base URL and the bearer
//! token. Both types derive their contract from a [`Shape`], and the codec
//! re-runs that shape on every encode and decode.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::{Schema, Shape, field, optional};

/// Route the client is sent to when no usable session exists.
pub const LOGIN_ROUTE: &str = "/login";

/// Authenticated identity derived from remote API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    avatar_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    name: String,
    wp_url: String,
}

impl User {
    /// Assemble a user from already validated parts.
    pub fn new(
        avatar_url: impl Into<String>,
        email: Option<String>,
        name: impl Into<String>,
        wp_url: impl Into<String>,
    ) -> Self {
        Self {
            avatar_url: avatar_url.into(),
            email,
            name: name.into(),
            wp_url: wp_url.into(),
        }
    }

    /// Largest avatar advertised by the profile.
    #[must_use]
    pub fn avatar_url(&self) -> &str {
        &self.avatar_url
    }

    /// Account e-mail, when the remote disclosed it.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Site URL the user logged in to.
    #[must_use]
    pub fn wp_url(&self) -> &str {
        &self.wp_url
    }
}

impl Schema for User {
    fn shape() -> Shape {
        Shape::object([
            field("avatar_url", Shape::url()),
            optional("email", Shape::email()),
            field("name", Shape::string()),
            field("wp_url", Shape::url()),
        ])
    }
}

/// Active authenticated context.
///
/// `Debug` output never includes the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(flatten)]
    user: User,
    api_url: String,
    token: String,
}

impl Session {
    /// Field holding the bearer token in the serialised form.
    pub const TOKEN_FIELD: &'static str = "token";
    /// Field holding the API base URL in the serialised form.
    pub const API_URL_FIELD: &'static str = "api_url";

    /// Combine an identity with its API endpoint and credential.
    pub fn new(user: User, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user,
            api_url: api_url.into(),
            token: token.into(),
        }
    }

    /// Identity part of the session.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Canonical REST API base URL, without a trailing slash.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Bearer token. Only held in memory for the duration of a request.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Schema for Session {
    fn shape() -> Shape {
        User::shape().extend([
            field(Self::API_URL_FIELD, Shape::url()),
            field(Self::TOKEN_FIELD, Shape::string()),
        ])
    }
}

/// Client redirect requested by a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    location: String,
}

impl Redirect {
    /// HTTP status used to realise the redirect.
    pub const STATUS: u16 = 302;

    /// Redirect to `location`.
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Redirect to the login entry point.
    #[must_use]
    pub fn login() -> Self {
        Self::to(LOGIN_ROUTE)
    }

    /// Target location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// Result of a lifecycle operation: carry on with a value, or stop and send
/// the client elsewhere. The calling layer decides how to realise the
/// redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// Processing continues with this value.
    Continue(T),
    /// Processing stops; the client should be redirected.
    Redirect(Redirect),
}

impl<T> Outcome<T> {
    /// Return the carried value, if processing continues.
    pub fn into_continue(self) -> Option<T> {
        match self {
            Self::Continue(value) => Some(value),
            Self::Redirect(_) => None,
        }
    }
}
