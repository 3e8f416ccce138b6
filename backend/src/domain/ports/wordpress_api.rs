//! Driven port for the remote WordPress REST API.
//!
//! The domain owns the request shapes and response contracts so the login
//! and upload use-cases stay adapter-agnostic. Every successful return value
//! has already passed its schema; adapters never hand back raw JSON.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::wordpress::{ValidToken, WpLoginData, WpTaxonomies, WpTerm, WpUser};
use crate::domain::{Error, LoginCredentials};

/// Media payload forwarded to the media endpoint unchanged.
///
/// `content_type` carries the multipart boundary of `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    content_type: String,
    body: Bytes,
}

impl MediaUpload {
    /// Wrap an encoded request body and its content type.
    pub fn new(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// `Content-Type` header value, including any boundary parameter.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Encoded body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Take ownership of the encoded body.
    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// Port for calling a WordPress site's REST API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WordPressApi: Send + Sync {
    /// Resolve a site URL into its REST API base URL (no trailing slash).
    async fn discover_api_url(&self, site_url: &str) -> Result<String, Error>;

    /// Exchange credentials for a bearer token at the JWT-auth endpoint.
    async fn request_token(
        &self,
        api_url: &str,
        credentials: &LoginCredentials,
    ) -> Result<WpLoginData, Error>;

    /// Fetch the profile of the token's owner.
    async fn fetch_profile(&self, api_url: &str, token: &str) -> Result<WpUser, Error>;

    /// Ask the remote whether `token` is still accepted.
    async fn validate_token(&self, api_url: &str, token: &str) -> Result<ValidToken, Error>;

    /// Upload one media payload and return the public URL of the new file.
    async fn upload_media(
        &self,
        api_url: &str,
        token: &str,
        upload: MediaUpload,
    ) -> Result<String, Error>;

    /// List taxonomies registered for attachments.
    async fn attachment_taxonomies(&self, api_url: &str, token: &str)
    -> Result<WpTaxonomies, Error>;

    /// List terms from a taxonomy's items endpoint, forwarding `query`.
    async fn taxonomy_terms(
        &self,
        endpoint: &str,
        token: &str,
        query: &[(String, String)],
    ) -> Result<Vec<WpTerm>, Error>;
}
