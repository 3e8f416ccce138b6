//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map them to HTTP
//! responses; none of them is retried automatically.

use std::fmt;

use super::schema::SchemaViolation;

/// The remote API answered with a non-success status.
///
/// `code` and `message` are only present when the body was a well-formed
/// WordPress error payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.describe())]
pub struct RemoteApiError {
    status: u16,
    status_text: String,
    code: Option<String>,
    message: Option<String>,
}

impl RemoteApiError {
    /// Error carrying the remote's own code and message.
    pub fn structured(
        status: u16,
        status_text: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            code: Some(code.into()),
            message: Some(message.into()),
        }
    }

    /// Error carrying only the transport status.
    pub fn status_only(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            code: None,
            message: None,
        }
    }

    /// HTTP status. For structured errors this is the status embedded in the
    /// body, which WordPress keeps equal to the transport status.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Canonical reason phrase of the transport status.
    #[must_use]
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Remote error code such as `rest_forbidden`.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Remote human-readable message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn describe(&self) -> String {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => format!("{message} ({code}, HTTP {})", self.status),
            _ => format!("HTTP {} {}", self.status, self.status_text),
        }
    }
}


/// The site could not be resolved to a REST API base URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    /// The site URL supplied by the user is not an absolute http(s) URL.
    #[error("invalid site URL '{url}'")]
    InvalidSiteUrl {
        /// Offending input.
        url: String,
    },
    /// The site did not answer the discovery request.
    #[error("site could not be reached during API discovery: {message}")]
    Unreachable {
        /// Transport diagnostic.
        message: String,
        /// Whether the request ran out of time.
        timed_out: bool,
    },
    /// The discovery request returned a non-success status.
    #[error("site responded with HTTP {status} during API discovery")]
    RequestFailed {
        /// Status of the discovery response.
        status: u16,
    },
    /// The site response carried no `Link` header.
    #[error("site response has no Link header")]
    MissingLinkHeader,
    /// A `Link` header exists but none of its entries has the REST API relation.
    #[error(
        "Link header has no https://api.w.org/ relation; this may not be a WordPress site"
    )]
    NoApiLink,
}

/// Why a stored session was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInvalidReason {
    /// The storage string was not valid base64 or UTF-8.
    Encoding,
    /// The decoded payload was not a JSON object with a string token.
    Malformed,
    /// The token ciphertext failed authentication.
    Decryption,
    /// The reconstructed session broke its shape.
    Schema(SchemaViolation),
}

impl fmt::Display for SessionInvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding => write!(f, "storage encoding is corrupt"),
            Self::Malformed => write!(f, "payload is not a session object"),
            Self::Decryption => write!(f, "token ciphertext failed authentication"),
            Self::Schema(violation) => write!(f, "{violation}"),
        }
    }
}

/// A stored session cannot be decoded, decrypted, or validated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored session is invalid: {reason}")]
pub struct SessionInvalid {
    reason: SessionInvalidReason,
}

impl SessionInvalid {
    /// Wrap a rejection reason.
    #[must_use]
    pub fn new(reason: SessionInvalidReason) -> Self {
        Self { reason }
    }

    /// Rejection reason, for logs only.
    #[must_use]
    pub fn reason(&self) -> &SessionInvalidReason {
        &self.reason
    }
}

/// Domain error returned by services and ports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Remote or stored data does not match its expected shape.
    #[error(transparent)]
    Schema(#[from] SchemaViolation),
    /// The remote API refused the request.
    #[error(transparent)]
    RemoteApi(#[from] RemoteApiError),
    /// The site does not expose a discoverable REST API.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// The stored session is unusable.
    #[error(transparent)]
    SessionInvalid(#[from] SessionInvalid),
    /// No response was received from the remote.
    #[error("remote transport failed: {message}")]
    Transport {
        /// Transport diagnostic.
        message: String,
        /// Whether the request timed out.
        timed_out: bool,
    },
    /// Caller input was rejected before any remote call.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Validation message.
        message: String,
    },
    /// A local invariant failed, for example the cipher refused its input.
    #[error("internal error: {message}")]
    Internal {
        /// Diagnostic for logs.
        message: String,
    },
}

impl Error {
    /// Convenience constructor for [`Error::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Transport`].
    pub fn transport(message: impl Into<String>, timed_out: bool) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out,
        }
    }
}
