//! Tests for the credential exchange service.

use std::sync::Arc;

use super::*;
use crate::domain::error::{DiscoveryError, RemoteApiError};
use crate::domain::ports::MockWordPressApi;
use crate::domain::schema::parse;
use crate::domain::wordpress::{VALID_TOKEN_CODE, WpLoginData, WpStatus, WpUser};
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::{Value, json};

const SITE: &str = "https://example.com";
const API: &str = "https://example.com/wp-json";
const TOKEN: &str = "server-issued-token";

fn credentials() -> LoginCredentials {
    LoginCredentials::try_from_parts(SITE, "admin", "hunter2").expect("valid credentials")
}

fn login_data(display_name: &str) -> WpLoginData {
    WpLoginData {
        user_email: "admin@example.com".to_owned(),
        user_display_name: display_name.to_owned(),
        user_nicename: "admin".to_owned(),
        token: TOKEN.to_owned(),
    }
}

fn profile(avatars: Value) -> WpUser {
    parse(json!({
        "avatar_urls": avatars,
        "description": "",
        "id": 1,
        "link": "https://example.com/author/admin",
        "name": "Admin",
        "slug": "admin",
        "url": SITE,
        "_links": {
            "self": [{ "href": "https://example.com/wp-json/wp/v2/users/1" }],
            "collection": [{ "href": "https://example.com/wp-json/wp/v2/users" }]
        }
    }))
    .expect("valid profile")
}

fn happy_api(display_name: &'static str) -> MockWordPressApi {
    let mut api = MockWordPressApi::new();
    api.expect_discover_api_url()
        .with(eq(SITE))
        .times(1)
        .return_once(|_| Ok(API.to_owned()));
    api.expect_request_token()
        .withf(|api_url, creds| api_url == API && creds.username() == "admin")
        .times(1)
        .return_once(move |_, _| Ok(login_data(display_name)));
    api.expect_fetch_profile()
        .with(eq(API), eq(TOKEN))
        .times(1)
        .return_once(|_, _| {
            Ok(profile(json!({
                "24": "https://gravatar.test/24",
                "96": "https://gravatar.test/96",
                "48": "https://gravatar.test/48"
            })))
        });
    api
}

#[tokio::test]
async fn login_assembles_the_session() {
    let service = AuthService::new(Arc::new(happy_api("Site Admin")));

    let session = service.login(&credentials()).await.expect("login succeeds");

    assert_eq!(session.token(), TOKEN);
    assert_eq!(session.api_url(), API);
    assert_eq!(session.user().avatar_url(), "https://gravatar.test/96");
    assert_eq!(session.user().name(), "Site Admin");
    assert_eq!(session.user().email(), Some("admin@example.com"));
    assert_eq!(session.user().wp_url(), SITE);
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn blank_display_name_falls_back_to_the_nicename(#[case] display_name: &'static str) {
    let service = AuthService::new(Arc::new(happy_api(display_name)));

    let session = service.login(&credentials()).await.expect("login succeeds");

    assert_eq!(session.user().name(), "admin");
}

#[tokio::test]
async fn discovery_failure_stops_the_login() {
    let mut api = MockWordPressApi::new();
    api.expect_discover_api_url()
        .times(1)
        .return_once(|_| Err(DiscoveryError::NoApiLink.into()));
    api.expect_request_token().never();
    api.expect_fetch_profile().never();

    let err = AuthService::new(Arc::new(api))
        .login(&credentials())
        .await
        .expect_err("no API");

    assert_eq!(err, Error::Discovery(DiscoveryError::NoApiLink));
}

#[tokio::test]
async fn rejected_credentials_never_fetch_the_profile() {
    let mut api = MockWordPressApi::new();
    api.expect_discover_api_url()
        .return_once(|_| Ok(API.to_owned()));
    api.expect_request_token().times(1).return_once(|_, _| {
        Err(RemoteApiError::structured(
            403,
            "Forbidden",
            "[jwt_auth] incorrect_password",
            "The password you entered is incorrect.",
        )
        .into())
    });
    api.expect_fetch_profile().never();

    let err = AuthService::new(Arc::new(api))
        .login(&credentials())
        .await
        .expect_err("bad password");

    let Error::RemoteApi(remote) = err else {
        panic!("expected remote error, got {err:?}");
    };
    assert_eq!(remote.status(), 403);
    assert_eq!(remote.code(), Some("[jwt_auth] incorrect_password"));
}

#[tokio::test]
async fn validate_token_sends_the_session_credential() {
    let mut api = MockWordPressApi::new();
    api.expect_validate_token()
        .with(eq(API), eq(TOKEN))
        .times(1)
        .return_once(|_, _| {
            Ok(ValidToken {
                code: VALID_TOKEN_CODE.to_owned(),
                data: WpStatus { status: 200 },
            })
        });
    let session = Session::new(
        User::new("https://gravatar.test/96", None, "Admin", SITE),
        API,
        TOKEN,
    );

    let valid = AuthService::new(Arc::new(api))
        .validate_token(&session)
        .await
        .expect("token accepted");

    assert_eq!(valid.code, VALID_TOKEN_CODE);
}
