//! Cookie-backed session jar.
//!
//! Handlers extract a [`SessionCookieJar`], hand it to the domain lifecycle
//! operations as a [`SessionJar`], and finally call
//! [`SessionCookieJar::finish`] so pending writes reach the response.

use std::convert::Infallible;

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::LOCATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::error;

use crate::domain::ports::SessionJar;
use crate::domain::{Error, Redirect};

/// Name of the cookie holding the encoded session.
pub const SESSION_COOKIE: &str = "session";
/// Lifetime of the session cookie.
pub const SESSION_MAX_AGE_DAYS: i64 = 7;

/// Attributes applied to every session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Mark cookies `Secure`.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
}

impl CookiePolicy {
    /// Cookie storing `value` with the session attributes.
    #[must_use]
    pub fn session_cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, value)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(Duration::days(SESSION_MAX_AGE_DAYS))
            .finish()
    }

    /// Cookie that clears the session in the browser.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new());
        cookie.make_removal();
        cookie
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingCookie {
    Set(String),
    Delete,
}

/// Per-request view of the session cookie.
#[derive(Debug, Clone, Default)]
pub struct SessionCookieJar {
    current: Option<String>,
    pending: Option<PendingCookie>,
}

impl SessionCookieJar {
    /// Read the session cookie sent with `req`.
    #[must_use]
    pub fn read(req: &HttpRequest) -> Self {
        Self {
            current: req
                .cookie(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_owned()),
            pending: None,
        }
    }

    /// Apply pending cookie writes to `response`.
    #[must_use]
    pub fn finish(self, mut response: HttpResponse, policy: &CookiePolicy) -> HttpResponse {
        let cookie = match self.pending {
            Some(PendingCookie::Set(value)) => policy.session_cookie(value),
            Some(PendingCookie::Delete) => policy.removal_cookie(),
            None => return response,
        };
        if let Err(err) = response.add_cookie(&cookie) {
            error!(error = %err, "failed to attach session cookie");
            return Error::internal("failed to attach session cookie").error_response();
        }
        response
    }
}

impl SessionJar for SessionCookieJar {
    fn get(&self) -> Option<String> {
        match &self.pending {
            Some(PendingCookie::Set(value)) => Some(value.clone()),
            Some(PendingCookie::Delete) => None,
            None => self.current.clone(),
        }
    }

    fn set(&mut self, value: String) {
        self.pending = Some(PendingCookie::Set(value));
    }

    fn delete(&mut self) {
        self.pending = Some(PendingCookie::Delete);
    }
}

impl FromRequest for SessionCookieJar {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::read(req)))
    }
}

/// `302 Found` pointing at the redirect's location.
#[must_use]
pub fn redirect_response(redirect: &Redirect) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, redirect.location()))
        .finish()
}
