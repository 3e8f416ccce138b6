//! Authenticated media uploads and taxonomy lookups.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::Error;
use crate::domain::ports::{MediaUpload, WordPressApi};
use crate::domain::session::Session;
use crate::domain::wordpress::{WpTaxonomies, WpTerm};

/// Media operations performed with a session's credential.
#[derive(Clone)]
pub struct MediaService {
    api: Arc<dyn WordPressApi>,
}

impl MediaService {
    /// Create a service over the given port.
    pub fn new(api: Arc<dyn WordPressApi>) -> Self {
        Self { api }
    }

    /// Upload `upload` and return the public URL of the stored file.
    ///
    /// # Errors
    /// Port failures, or [`Error::InvalidRequest`] for an empty body.
    #[instrument(skip_all, fields(api_url = %session.api_url(), bytes = upload.body().len()))]
    pub async fn upload(&self, session: &Session, upload: MediaUpload) -> Result<String, Error> {
        if upload.body().is_empty() {
            return Err(Error::invalid_request("upload body must not be empty"));
        }
        self.api
            .upload_media(session.api_url(), session.token(), upload)
            .await
    }

    /// Taxonomies registered for attachments, keyed by slug.
    ///
    /// # Errors
    /// Port failures.
    pub async fn taxonomies(&self, session: &Session) -> Result<WpTaxonomies, Error> {
        self.api
            .attachment_taxonomies(session.api_url(), session.token())
            .await
    }

    /// Terms of the attachment taxonomy named `slug`.
    ///
    /// The terms endpoint is taken from the taxonomy's `wp:items` link, so
    /// custom REST bases resolve without guessing.
    ///
    /// # Errors
    /// [`Error::InvalidRequest`] when no attachment taxonomy has that slug or
    /// it advertises no items endpoint; otherwise port failures.
    #[instrument(skip(self, session, query))]
    pub async fn terms(
        &self,
        session: &Session,
        slug: &str,
        query: &[(String, String)],
    ) -> Result<Vec<WpTerm>, Error> {
        let taxonomies = self.taxonomies(session).await?;
        let taxonomy = taxonomies
            .get(slug)
            .ok_or_else(|| Error::invalid_request(format!("unknown taxonomy '{slug}'")))?;
        let endpoint = taxonomy.terms_endpoint().ok_or_else(|| {
            Error::invalid_request(format!("taxonomy '{slug}' has no terms endpoint"))
        })?;
        self.api
            .taxonomy_terms(endpoint, session.token(), query)
            .await
    }
}
