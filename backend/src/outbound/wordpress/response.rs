//! Uniform interpretation of WordPress REST responses.
//!
//! Every outbound call funnels through [`handle_response`], which consumes
//! the body exactly once and splits failures into "the remote said no"
//! ([`RemoteApiError`]) and "the remote said yes but the body is wrong"
//! ([`SchemaViolation`]).

use reqwest::{Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::Error;
use crate::domain::error::RemoteApiError;
use crate::domain::schema::{SchemaViolation, parse_slice};
use crate::domain::wordpress::WpRestError;

/// Read `response` and hand a successful JSON body to `on_success`.
///
/// # Errors
/// [`Error::RemoteApi`] for non-success statuses, [`Error::Schema`] when the
/// body is not JSON or `on_success` rejects it, and [`Error::Transport`] when
/// the body cannot be read.
pub async fn handle_response<T, F>(response: Response, on_success: F) -> Result<T, Error>
where
    F: FnOnce(Value) -> Result<T, SchemaViolation>,
{
    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    interpret(status, &body, on_success)
}

/// Status/body half of [`handle_response`], free of I/O.
pub(crate) fn interpret<T, F>(status: StatusCode, body: &[u8], on_success: F) -> Result<T, Error>
where
    F: FnOnce(Value) -> Result<T, SchemaViolation>,
{
    if !status.is_success() {
        let error = remote_error(status, body);
        warn!(
            status = error.status(),
            code = error.code().unwrap_or_default(),
            "remote API refused the request"
        );
        return Err(error.into());
    }

    debug!(status = status.as_u16(), bytes = body.len(), "remote API succeeded");
    let value: Value = serde_json::from_slice(body)
        .map_err(|err| SchemaViolation::malformed(format!("response is not JSON: {err}")))?;
    on_success(value).map_err(Error::from)
}

fn remote_error(status: StatusCode, body: &[u8]) -> RemoteApiError {
    let status_text = status.canonical_reason().unwrap_or_default();
    match parse_slice::<WpRestError>(body) {
        Ok(rest) => {
            RemoteApiError::structured(rest.data.status, status_text, rest.code, rest.message)
        }
        Err(_) => RemoteApiError::status_only(status.as_u16(), status_text),
    }
}

/// Map a reqwest failure that happened before a response was available.
pub(crate) fn map_transport_error(error: reqwest::Error) -> Error {
    let timed_out = error.is_timeout();
    warn!(error = %error, timed_out, "remote API unreachable");
    Error::transport(error.to_string(), timed_out)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for response interpretation.
    use super::*;
    use crate::domain::schema::{Constraint, Shape, parse, parse_with};
    use crate::domain::wordpress::{ValidToken, WpMediaItem};
    use rstest::rstest;

    fn source_url(value: Value) -> Result<String, SchemaViolation> {
        parse::<WpMediaItem>(value).map(|item| item.source_url)
    }

    #[rstest]
    fn structured_error_body_keeps_code_and_status() {
        let body = br#"{"code":"rest_forbidden","message":"Forbidden","data":{"status":403}}"#;

        let err = interpret(StatusCode::FORBIDDEN, body, source_url).expect_err("403");

        let Error::RemoteApi(remote) = err else {
            panic!("expected remote error, got {err:?}");
        };
        assert_eq!(remote.code(), Some("rest_forbidden"));
        assert_eq!(remote.message(), Some("Forbidden"));
        assert_eq!(remote.status(), 403);
    }

    #[rstest]
    #[case(b"<html>Bad Gateway</html>".as_slice(), StatusCode::BAD_GATEWAY)]
    #[case(br#"{"code":"x"}"#.as_slice(), StatusCode::NOT_FOUND)]
    #[case(b"".as_slice(), StatusCode::INTERNAL_SERVER_ERROR)]
    fn unusable_error_body_keeps_only_the_status(#[case] body: &[u8], #[case] status: StatusCode) {
        let err = interpret(status, body, source_url).expect_err("non-OK");

        assert_eq!(
            err,
            Error::RemoteApi(RemoteApiError::status_only(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ))
        );
    }

    #[rstest]
    fn success_body_that_is_not_json_is_a_schema_violation() {
        let err = interpret(StatusCode::OK, b"<!doctype html>", source_url).expect_err("html");
        let Error::Schema(violation) = err else {
            panic!("expected schema violation, got {err:?}");
        };
        assert!(matches!(violation.constraint(), Constraint::Malformed { .. }));
    }

    #[rstest]
    fn projection_failure_propagates_unchanged() {
        let body = br#"{"code":"jwt_auth_valid_token","data":{"status":403}}"#;

        let err = interpret(StatusCode::OK, body, parse::<ValidToken>).expect_err("embedded 403");

        let Error::Schema(violation) = err else {
            panic!("expected schema violation, got {err:?}");
        };
        assert_eq!(violation.path().to_string(), "$.data.status");
    }

    #[rstest]
    fn success_hands_the_value_to_the_projection() {
        let value: String = interpret(StatusCode::OK, br#""https://example.com/wp-json""#, |v| {
            parse_with(&Shape::url(), v)
        })
        .expect("string body");
        assert_eq!(value, "https://example.com/wp-json");
    }
}
