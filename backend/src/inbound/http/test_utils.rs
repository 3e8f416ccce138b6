//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::ServiceResponse;
use secrecy::SecretString;

use crate::domain::ports::MockWordPressApi;
use crate::domain::{Session, SessionCodec, User};
use crate::inbound::http::session::{CookiePolicy, SESSION_COOKIE};
use crate::inbound::http::state::HttpState;

pub const SITE: &str = "https://example.com";
pub const API: &str = "https://example.com/wp-json";
pub const TOKEN: &str = "server-issued-token";

/// Codec keyed with a fixed 32-byte secret.
pub fn test_codec() -> SessionCodec {
    SessionCodec::new(&SecretString::from("0123456789abcdef0123456789abcdef"))
}

/// Cookie policy without the `Secure` flag for plain HTTP tests.
pub fn test_cookies() -> CookiePolicy {
    CookiePolicy {
        secure: false,
        same_site: SameSite::Lax,
    }
}

/// Handler state over `api`.
pub fn test_state(api: MockWordPressApi) -> HttpState {
    HttpState::new(Arc::new(api), test_codec(), test_cookies())
}

pub fn sample_session() -> Session {
    Session::new(
        User::new(
            "https://secure.gravatar.com/avatar/abc?s=96",
            Some("admin@example.com".to_owned()),
            "Admin",
            SITE,
        ),
        API,
        TOKEN,
    )
}

/// Request cookie carrying `session` in storage form.
pub fn session_cookie(session: &Session) -> Cookie<'static> {
    let encoded = test_codec().encode(session).expect("encodable session");
    Cookie::new(SESSION_COOKIE, encoded)
}

/// Session cookie set on `response`, if any.
pub fn response_session_cookie<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
}
