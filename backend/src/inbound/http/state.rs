//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::WordPressApi;
use crate::domain::{AuthService, MediaService, SessionCodec};
use crate::inbound::http::session::CookiePolicy;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Login and token validation.
    pub auth: AuthService,
    /// Uploads and taxonomy lookups.
    pub media: MediaService,
    /// Storage form of sessions.
    pub codec: SessionCodec,
    /// Session cookie attributes.
    pub cookies: CookiePolicy,
    /// Site used when a login request names none.
    pub default_site_url: Option<String>,
}

impl HttpState {
    /// Build handler state with both services sharing one API port.
    pub fn new(api: Arc<dyn WordPressApi>, codec: SessionCodec, cookies: CookiePolicy) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&api)),
            media: MediaService::new(api),
            codec,
            cookies,
            default_site_url: None,
        }
    }

    /// Use `site_url` for login requests without one.
    #[must_use]
    pub fn with_default_site_url(mut self, site_url: Option<String>) -> Self {
        self.default_site_url = site_url;
        self
    }
}
