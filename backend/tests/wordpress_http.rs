//! Outbound adapter behaviour against a mocked WordPress site.

use std::net::TcpListener;
use std::time::Duration;

use rstest::rstest;
use reqwest::header::HeaderValue;
use serde_json::json;
use wiremock::matchers::{body_bytes, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wp_uploader::domain::error::{DiscoveryError, RemoteApiError};
use wp_uploader::domain::ports::{MediaUpload, WordPressApi};
use wp_uploader::domain::schema::Constraint;
use wp_uploader::domain::{Error, LoginCredentials};
use wp_uploader::outbound::wordpress::{DiscoveryStrategy, WordPressHttpApi};

const TOKEN: &str = "server-issued-token";

fn adapter(discovery: DiscoveryStrategy) -> WordPressHttpApi {
    WordPressHttpApi::new(Duration::from_secs(5), discovery).expect("client")
}

fn api_link(server: &MockServer) -> String {
    format!(r#"<{}/wp-json/>; rel="https://api.w.org/""#, server.uri())
}

#[tokio::test]
async fn passive_discovery_reads_the_link_header() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Link", format!("<{}/?p=2>; rel=shortlink", server.uri()))
                .append_header("Link", api_link(&server)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api_url = adapter(DiscoveryStrategy::Passive)
        .discover_api_url(&server.uri())
        .await
        .expect("discovered");

    assert_eq!(api_url, format!("{}/wp-json", server.uri()));
}

#[rstest]
#[case::missing_header(ResponseTemplate::new(200), DiscoveryError::MissingLinkHeader)]
#[case::other_relation(
    ResponseTemplate::new(200).insert_header("Link", "<https://example.com/feed>; rel=alternate"),
    DiscoveryError::NoApiLink
)]
#[case::not_found(ResponseTemplate::new(404), DiscoveryError::RequestFailed { status: 404 })]
#[tokio::test]
async fn passive_discovery_failures_stay_distinct(
    #[case] response: ResponseTemplate,
    #[case] expected: DiscoveryError,
) {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(response)
        .mount(&server)
        .await;

    let err = adapter(DiscoveryStrategy::Passive)
        .discover_api_url(&server.uri())
        .await
        .expect_err("discovery fails");

    assert_eq!(err, Error::Discovery(expected));
}

#[tokio::test]
async fn undecodable_link_headers_are_not_reported_missing() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header(
            "Link",
            HeaderValue::from_bytes(b"<https://example.com/\xff>; rel=alternate")
                .expect("header value"),
        ))
        .mount(&server)
        .await;

    let err = adapter(DiscoveryStrategy::Passive)
        .discover_api_url(&server.uri())
        .await
        .expect_err("discovery fails");

    assert_eq!(err, Error::Discovery(DiscoveryError::NoApiLink));
}

#[rstest]
#[case::passive(DiscoveryStrategy::Passive)]
#[case::active(DiscoveryStrategy::Active { path: "/wp-json/uploader/v1/api-url".to_owned() })]
#[tokio::test]
async fn unreachable_sites_fail_discovery(#[case] strategy: DiscoveryStrategy) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let site = format!("http://{}", listener.local_addr().expect("local addr"));
    drop(listener);

    let err = adapter(strategy)
        .discover_api_url(&site)
        .await
        .expect_err("nothing listens");

    assert!(matches!(
        err,
        Error::Discovery(DiscoveryError::Unreachable {
            timed_out: false,
            ..
        })
    ));
}

#[tokio::test]
async fn discovery_rejects_relative_site_urls() {
    let err = adapter(DiscoveryStrategy::Passive)
        .discover_api_url("example.com")
        .await
        .expect_err("invalid url");

    assert!(matches!(
        err,
        Error::Discovery(DiscoveryError::InvalidSiteUrl { .. })
    ));
}

#[tokio::test]
async fn active_discovery_reads_the_json_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/uploader/v1/api-url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(format!(
            "{}/wp-json/",
            server.uri()
        ))))
        .expect(1)
        .mount(&server)
        .await;

    let api_url = adapter(DiscoveryStrategy::Active {
        path: "/wp-json/uploader/v1/api-url".to_owned(),
    })
    .discover_api_url(&format!("{}/", server.uri()))
    .await
    .expect("discovered");

    assert_eq!(api_url, format!("{}/wp-json", server.uri()));
}

#[tokio::test]
async fn token_request_posts_the_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/jwt-auth/v1/token"))
        .and(body_json(json!({ "username": "admin", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": TOKEN,
            "user_email": "admin@example.com",
            "user_nicename": "admin",
            "user_display_name": "Admin"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let credentials =
        LoginCredentials::try_from_parts(&server.uri(), "admin", "hunter2").expect("creds");

    let data = adapter(DiscoveryStrategy::Passive)
        .request_token(&format!("{}/wp-json", server.uri()), &credentials)
        .await
        .expect("token");

    assert_eq!(data.token, TOKEN);
    assert_eq!(data.preferred_name(), "Admin");
}

#[tokio::test]
async fn structured_rejections_keep_code_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/users/me"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "rest_forbidden",
            "message": "Sorry, you are not allowed to do that.",
            "data": { "status": 403 }
        })))
        .mount(&server)
        .await;

    let err = adapter(DiscoveryStrategy::Passive)
        .fetch_profile(&format!("{}/wp-json", server.uri()), TOKEN)
        .await
        .expect_err("forbidden");

    assert_eq!(
        err,
        Error::RemoteApi(RemoteApiError::structured(
            403,
            "Forbidden",
            "rest_forbidden",
            "Sorry, you are not allowed to do that.",
        ))
    );
}

#[tokio::test]
async fn unstructured_rejections_keep_only_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let err = adapter(DiscoveryStrategy::Passive)
        .validate_token(&format!("{}/wp-json", server.uri()), TOKEN)
        .await
        .expect_err("bad gateway");

    let Error::RemoteApi(remote) = err else {
        panic!("expected a remote error, got {err:?}");
    };
    assert_eq!(remote.status(), 502);
    assert_eq!(remote.code(), None);
}

#[tokio::test]
async fn token_validation_checks_the_embedded_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/jwt-auth/v1/token/validate"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "jwt_auth_valid_token",
            "data": { "status": 403 }
        })))
        .mount(&server)
        .await;

    let err = adapter(DiscoveryStrategy::Passive)
        .validate_token(&format!("{}/wp-json", server.uri()), TOKEN)
        .await
        .expect_err("embedded status is not 200");

    let Error::Schema(violation) = err else {
        panic!("expected a schema violation, got {err:?}");
    };
    assert_eq!(violation.path().to_string(), "$.data.status");
    assert!(matches!(violation.constraint(), Constraint::Literal { .. }));
}

#[tokio::test]
async fn upload_forwards_the_body_and_returns_the_source_url() {
    let server = MockServer::start().await;
    let body: &[u8] = concat!(
        "--b\r\n",
        "Content-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\r\n",
        "PNG\r\n--b--\r\n",
    )
    .as_bytes();
    let source_url = format!("{}/wp-content/uploads/a.png", server.uri());
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/media"))
        .and(header("content-type", "multipart/form-data; boundary=b"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_bytes(body))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7,
            "date": "2024-01-01T00:00:00",
            "date_gmt": "2024-01-01T00:00:00",
            "caption": { "raw": "", "rendered": "" },
            "description": { "raw": "", "rendered": "" },
            "guid": { "raw": source_url, "rendered": source_url },
            "link": format!("{}/a", server.uri()),
            "slug": "a",
            "source_url": source_url,
            "title": { "raw": "a", "rendered": "a" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uploaded = adapter(DiscoveryStrategy::Passive)
        .upload_media(
            &format!("{}/wp-json", server.uri()),
            TOKEN,
            MediaUpload::new("multipart/form-data; boundary=b", body),
        )
        .await
        .expect("uploaded");

    assert_eq!(uploaded, source_url);
}

#[tokio::test]
async fn attachment_taxonomies_are_filtered_by_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/taxonomies"))
        .and(query_param("type", "attachment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let taxonomies = adapter(DiscoveryStrategy::Passive)
        .attachment_taxonomies(&format!("{}/wp-json", server.uri()), TOKEN)
        .await
        .expect("taxonomies");

    assert!(taxonomies.is_empty());
}

#[tokio::test]
async fn slow_sites_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;
    let api = WordPressHttpApi::new(Duration::from_millis(50), DiscoveryStrategy::Passive)
        .expect("client");

    let err = api
        .validate_token(&format!("{}/wp-json", server.uri()), TOKEN)
        .await
        .expect_err("timed out");

    assert!(matches!(err, Error::Transport { timed_out: true, .. }));
}
