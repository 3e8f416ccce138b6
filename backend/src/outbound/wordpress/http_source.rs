//! Reqwest-backed WordPress REST adapter.
//!
//! This adapter owns transport details only: endpoint paths, bearer
//! authentication, the request timeout and body encoding. Interpreting the
//! response is delegated to [`handle_response`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use tracing::{debug, instrument};

use super::discovery::{DiscoveryStrategy, discover};
use super::response::{handle_response, map_transport_error};
use crate::domain::ports::{MediaUpload, WordPressApi};
use crate::domain::schema::parse;
use crate::domain::wordpress::{ValidToken, WpLoginData, WpMediaItem, WpTaxonomies, WpTerm, WpUser};
use crate::domain::{Error, LoginCredentials};

const DEFAULT_USER_AGENT: &str = concat!("wp-uploader/", env!("CARGO_PKG_VERSION"));

/// WordPress adapter that talks to any site through one shared client.
pub struct WordPressHttpApi {
    client: Client,
    discovery: DiscoveryStrategy,
}

impl WordPressHttpApi {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration, discovery: DiscoveryStrategy) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, discovery })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;
        debug!(
            url = %response.url().path(),
            status = response.status().as_u16(),
            "WordPress responded"
        );
        Ok(response)
    }
}

#[async_trait]
impl WordPressApi for WordPressHttpApi {
    #[instrument(skip(self))]
    async fn discover_api_url(&self, site_url: &str) -> Result<String, Error> {
        discover(&self.client, &self.discovery, site_url).await
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn request_token(
        &self,
        api_url: &str,
        credentials: &LoginCredentials,
    ) -> Result<WpLoginData, Error> {
        let request = self
            .client
            .post(format!("{api_url}/jwt-auth/v1/token"))
            .json(&json!({
                "username": credentials.username(),
                "password": credentials.password(),
            }));
        handle_response(self.send(request).await?, parse::<WpLoginData>).await
    }

    #[instrument(skip(self, token))]
    async fn fetch_profile(&self, api_url: &str, token: &str) -> Result<WpUser, Error> {
        let request = self
            .client
            .post(format!("{api_url}/wp/v2/users/me"))
            .bearer_auth(token);
        handle_response(self.send(request).await?, parse::<WpUser>).await
    }

    #[instrument(skip(self, token))]
    async fn validate_token(&self, api_url: &str, token: &str) -> Result<ValidToken, Error> {
        let request = self
            .client
            .post(format!("{api_url}/jwt-auth/v1/token/validate"))
            .bearer_auth(token);
        handle_response(self.send(request).await?, parse::<ValidToken>).await
    }

    #[instrument(skip(self, token, upload), fields(content_type = %upload.content_type()))]
    async fn upload_media(
        &self,
        api_url: &str,
        token: &str,
        upload: MediaUpload,
    ) -> Result<String, Error> {
        let content_type = upload.content_type().to_owned();
        let request = self
            .client
            .post(format!("{api_url}/wp/v2/media"))
            .bearer_auth(token)
            .header(CONTENT_TYPE, content_type)
            .body(upload.into_body());
        handle_response(self.send(request).await?, |value| {
            parse::<WpMediaItem>(value).map(|item| item.source_url)
        })
        .await
    }

    #[instrument(skip(self, token))]
    async fn attachment_taxonomies(
        &self,
        api_url: &str,
        token: &str,
    ) -> Result<WpTaxonomies, Error> {
        let request = self
            .client
            .get(format!("{api_url}/wp/v2/taxonomies"))
            .query(&[("type", "attachment")])
            .bearer_auth(token);
        handle_response(self.send(request).await?, parse::<WpTaxonomies>).await
    }

    #[instrument(skip(self, token, query))]
    async fn taxonomy_terms(
        &self,
        endpoint: &str,
        token: &str,
        query: &[(String, String)],
    ) -> Result<Vec<WpTerm>, Error> {
        let request = self.client.get(endpoint).query(query).bearer_auth(token);
        handle_response(self.send(request).await?, parse::<Vec<WpTerm>>).await
    }
}
