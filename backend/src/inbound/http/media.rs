//! Media upload and taxonomy handlers.
//!
//! ```text
//! POST /api/media                      (multipart body forwarded as-is)
//! GET  /api/taxonomies
//! GET  /api/taxonomies/{slug}/terms?search=...
//! ```

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::ports::MediaUpload;
use crate::domain::{Error, Outcome, require_session};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::session_required;
use crate::inbound::http::session::SessionCookieJar;
use crate::inbound::http::state::HttpState;

/// Response body for a completed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Public URL of the stored file.
    pub source_url: String,
}

fn content_type(req: &HttpRequest) -> Result<String, Error> {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(str::to_owned)
        .ok_or_else(|| Error::invalid_request("Content-Type header is required"))
}

/// Forward an encoded upload to the site's media endpoint.
#[post("/api/media")]
pub async fn upload_media(
    state: web::Data<HttpState>,
    mut jar: SessionCookieJar,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let Outcome::Continue(session) = require_session(&mut jar, &state.codec) else {
        return Ok(session_required(jar, &state.cookies));
    };

    let upload = MediaUpload::new(content_type(&req)?, body);
    let source_url = state.media.upload(&session, upload).await?;
    info!(%source_url, "media uploaded");

    Ok(HttpResponse::Created().json(UploadResponse { source_url }))
}

/// Attachment taxonomies keyed by slug.
#[get("/api/taxonomies")]
pub async fn taxonomies(
    state: web::Data<HttpState>,
    mut jar: SessionCookieJar,
) -> ApiResult<HttpResponse> {
    let Outcome::Continue(session) = require_session(&mut jar, &state.codec) else {
        return Ok(session_required(jar, &state.cookies));
    };

    let taxonomies = state.media.taxonomies(&session).await?;
    Ok(HttpResponse::Ok().json(taxonomies))
}

/// Terms of one attachment taxonomy; the query string is forwarded.
#[get("/api/taxonomies/{slug}/terms")]
pub async fn taxonomy_terms(
    state: web::Data<HttpState>,
    mut jar: SessionCookieJar,
    path: web::Path<String>,
    query: web::Query<Vec<(String, String)>>,
) -> ApiResult<HttpResponse> {
    let Outcome::Continue(session) = require_session(&mut jar, &state.codec) else {
        return Ok(session_required(jar, &state.cookies));
    };

    let terms = state
        .media
        .terms(&session, &path.into_inner(), &query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(terms))
}
