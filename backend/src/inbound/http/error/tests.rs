//! Tests for HTTP error mapping.

use super::*;
use crate::domain::error::{DiscoveryError, RemoteApiError, SessionInvalid, SessionInvalidReason};
use crate::domain::schema::SchemaViolation;
use actix_web::body::to_bytes;
use rstest::rstest;
use serde_json::{Value, json};

#[rstest]
#[case(Error::Schema(SchemaViolation::malformed("x")), StatusCode::BAD_GATEWAY)]
#[case(
    RemoteApiError::structured(403, "Forbidden", "rest_forbidden", "Forbidden").into(),
    StatusCode::FORBIDDEN
)]
#[case(
    RemoteApiError::status_only(401, "Unauthorized").into(),
    StatusCode::UNAUTHORIZED
)]
#[case(
    RemoteApiError::status_only(500, "Internal Server Error").into(),
    StatusCode::BAD_GATEWAY
)]
#[case(DiscoveryError::NoApiLink.into(), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(
    DiscoveryError::Unreachable { message: "refused".to_owned(), timed_out: false }.into(),
    StatusCode::UNPROCESSABLE_ENTITY
)]
#[case(
    SessionInvalid::new(SessionInvalidReason::Decryption).into(),
    StatusCode::UNAUTHORIZED
)]
#[case(Error::transport("timed out", true), StatusCode::GATEWAY_TIMEOUT)]
#[case(Error::transport("refused", false), StatusCode::BAD_GATEWAY)]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::internal("cipher"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_kind(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), expected);
}

async fn body_json(error: &Error) -> Value {
    let response = ResponseError::error_response(error);
    let bytes = to_bytes(response.into_body()).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[actix_rt::test]
async fn remote_errors_expose_the_remote_code() {
    let error: Error =
        RemoteApiError::structured(403, "Forbidden", "rest_forbidden", "Sorry, no.").into();

    let body = body_json(&error).await;

    assert_eq!(
        body,
        json!({
            "code": "remote_api_error",
            "message": "Sorry, no. (rest_forbidden, HTTP 403)",
            "status": 403,
            "remote_code": "rest_forbidden"
        })
    );
}

#[actix_rt::test]
async fn schema_paths_stay_out_of_the_body() {
    let error = Error::Schema(SchemaViolation::malformed("secret detail at $.token"));

    let body = body_json(&error).await;

    assert_eq!(body["code"], "schema_violation");
    assert!(!body.to_string().contains("$.token"));
}

#[actix_rt::test]
async fn internal_errors_are_redacted() {
    let body = body_json(&Error::internal("key material mismatch")).await;
    assert_eq!(body["message"], "Internal server error");
}

#[actix_rt::test]
async fn malformed_json_bodies_are_bad_requests() {
    use actix_web::{App, post, test as actix_test, web};

    #[post("/echo")]
    async fn echo(payload: web::Json<Value>) -> HttpResponse {
        HttpResponse::Ok().json(payload.into_inner())
    }

    let app = actix_test::init_service(
        App::new()
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(echo),
    )
    .await;
    let request = actix_test::TestRequest::post()
        .uri("/echo")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();

    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("code").and_then(Value::as_str), Some("invalid_request"));
}
