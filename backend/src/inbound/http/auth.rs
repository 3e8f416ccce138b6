//! Login, logout and session handlers.
//!
//! ```text
//! POST /api/login {"site_url":"https://example.com","username":"admin","password":"..."}
//! GET  /api/session
//! GET  /logout
//! POST /logout
//! ```

use std::fmt;

use actix_web::{HttpResponse, get, post, route, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::ports::SessionJar;
use crate::domain::{
    Error, LoginCredentials, LoginValidationError, Outcome, logout as end_session, require_session,
    store_session,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::session::{CookiePolicy, SessionCookieJar, redirect_response};
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/login`.
#[derive(Deserialize, Serialize)]
pub struct LoginRequest {
    /// Site to log in to; the configured default is used when absent.
    #[serde(default)]
    pub site_url: Option<String>,
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("site_url", &self.site_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn map_login_validation_error(err: &LoginValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

/// `401` telling the client to log in again, clearing any stale cookie.
pub(crate) fn session_required(jar: SessionCookieJar, cookies: &CookiePolicy) -> HttpResponse {
    jar.finish(
        HttpResponse::Unauthorized().json(ErrorBody::new("session_required", "login required")),
        cookies,
    )
}

/// Authenticate against a WordPress site and store the session cookie.
///
/// The response body is the [`crate::domain::User`]; the token never leaves
/// the server in clear text.
#[post("/api/login")]
pub async fn login(
    state: web::Data<HttpState>,
    mut jar: SessionCookieJar,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let site_url = payload
        .site_url
        .as_deref()
        .or(state.default_site_url.as_deref())
        .ok_or_else(|| Error::invalid_request("site_url is required"))?;
    let credentials =
        LoginCredentials::try_from_parts(site_url, &payload.username, &payload.password)
            .map_err(|err| map_login_validation_error(&err))?;

    let session = state.auth.login(&credentials).await?;
    store_session(&mut jar, &state.codec, &session)?;
    info!(site_url = %credentials.site_url(), "user logged in");

    Ok(jar.finish(HttpResponse::Ok().json(session.user()), &state.cookies))
}

/// Current user, after confirming the remote still accepts the token.
#[get("/api/session")]
pub async fn current_session(
    state: web::Data<HttpState>,
    mut jar: SessionCookieJar,
) -> ApiResult<HttpResponse> {
    let Outcome::Continue(session) = require_session(&mut jar, &state.codec) else {
        return Ok(session_required(jar, &state.cookies));
    };

    match state.auth.validate_token(&session).await {
        Ok(_) => Ok(HttpResponse::Ok().json(session.user())),
        Err(err) if rejects_token(&err) => {
            warn!(error = %err, "remote rejected the session token");
            jar.delete();
            Ok(session_required(jar, &state.cookies))
        }
        Err(err) => Err(err),
    }
}

fn rejects_token(err: &Error) -> bool {
    match err {
        Error::Schema(_) => true,
        Error::RemoteApi(remote) => (400..500).contains(&remote.status()),
        _ => false,
    }
}

/// Destroy the session and redirect to the login page.
#[route("/logout", method = "GET", method = "POST")]
pub async fn logout(state: web::Data<HttpState>, mut jar: SessionCookieJar) -> HttpResponse {
    let response = match end_session(&mut jar) {
        Outcome::Redirect(redirect) => redirect_response(&redirect),
        Outcome::Continue(never) => match never {},
    };
    jar.finish(response, &state.cookies)
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
