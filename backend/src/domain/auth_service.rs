//! Credential exchange and token liveness.
//!
//! Login is all-or-nothing: discovery, token exchange and profile fetch must
//! all succeed before a [`Session`] exists.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::ports::WordPressApi;
use crate::domain::schema::{Constraint, FieldPath, SchemaViolation};
use crate::domain::session::{Session, User};
use crate::domain::wordpress::ValidToken;
use crate::domain::{Error, LoginCredentials};

/// Login and token validation against one WordPress API port.
#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn WordPressApi>,
}

impl AuthService {
    /// Create a service over the given port.
    pub fn new(api: Arc<dyn WordPressApi>) -> Self {
        Self { api }
    }

    /// Authenticate `credentials` and assemble a session.
    ///
    /// # Errors
    /// Propagates discovery, remote, transport and schema failures from the
    /// port. A profile without any avatar is a schema violation at
    /// `$.avatar_urls`.
    #[instrument(skip_all, fields(site_url = %credentials.site_url()))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        let api_url = self.api.discover_api_url(credentials.site_url()).await?;
        debug!(%api_url, "resolved REST API base");

        let login = self.api.request_token(&api_url, credentials).await?;
        let profile = self.api.fetch_profile(&api_url, &login.token).await?;

        let avatar_url = profile.largest_avatar().ok_or_else(|| {
            SchemaViolation::at(FieldPath::root().child("avatar_urls"), Constraint::NonEmpty)
        })?;

        let user = User::new(
            avatar_url,
            Some(login.user_email.clone()),
            login.preferred_name(),
            credentials.site_url(),
        );
        debug!(user_id = profile.id, "login succeeded");
        Ok(Session::new(user, api_url, login.token))
    }

    /// Confirm the remote still accepts the session's token.
    ///
    /// # Errors
    /// A rejected token surfaces as [`Error::RemoteApi`] when the transport
    /// status says so, or as [`Error::Schema`] when the body does not carry
    /// the exact affirmative code and embedded status.
    #[instrument(skip_all, fields(api_url = %session.api_url()))]
    pub async fn validate_token(&self, session: &Session) -> Result<ValidToken, Error> {
        self.api
            .validate_token(session.api_url(), session.token())
            .await
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
