//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes. Schema paths and transport diagnostics stay in the logs.

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::{error, warn};

use crate::domain::Error;
use crate::middleware::trace::TraceId;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// JSON body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Stable error category.
    pub code: &'static str,
    /// Human-readable explanation safe to show to the user.
    pub message: String,
    /// Status reported by the remote site, when it answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Error code reported by the remote site, when it supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_code: Option<String>,
    /// Correlation identifier of the failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ErrorBody {
    /// Body with no remote details, tagged with the current trace id.
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            status: None,
            remote_code: None,
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Schema(_) => StatusCode::BAD_GATEWAY,
        Error::RemoteApi(remote) => StatusCode::from_u16(remote.status())
            .ok()
            .filter(StatusCode::is_client_error)
            .unwrap_or(StatusCode::BAD_GATEWAY),
        Error::Discovery(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::SessionInvalid(_) => StatusCode::UNAUTHORIZED,
        Error::Transport { timed_out, .. } => {
            if *timed_out {
                StatusCode::GATEWAY_TIMEOUT
            } else {
                StatusCode::BAD_GATEWAY
            }
        }
        Error::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Body for `error`, with internal details removed.
#[must_use]
pub fn error_body(error: &Error) -> ErrorBody {
    match error {
        Error::Schema(_) => ErrorBody::new(
            "schema_violation",
            "the WordPress site returned an unexpected response",
        ),
        Error::RemoteApi(remote) => ErrorBody {
            status: Some(remote.status()),
            remote_code: remote.code().map(str::to_owned),
            ..ErrorBody::new("remote_api_error", remote.to_string())
        },
        Error::Discovery(discovery) => ErrorBody::new("discovery_failed", discovery.to_string()),
        Error::SessionInvalid(_) => ErrorBody::new("session_invalid", "session is no longer valid"),
        Error::Transport { timed_out, .. } => ErrorBody::new(
            "transport_error",
            if *timed_out {
                "the WordPress site did not answer in time"
            } else {
                "the WordPress site could not be reached"
            },
        ),
        Error::InvalidRequest { message } => ErrorBody::new("invalid_request", message.clone()),
        Error::Internal { .. } => ErrorBody::new("internal_error", "Internal server error"),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        HttpResponse::build(status).json(error_body(self))
    }
}

/// Answer malformed JSON request bodies with the usual error body.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorBody::new("invalid_request", err.to_string());
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

#[cfg(test)]
mod tests;
