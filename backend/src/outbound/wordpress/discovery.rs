//! Resolve a site URL into its REST API base URL.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Client;
use reqwest::header::LINK;
use tracing::{debug, warn};
use url::Url;

use super::response::handle_response;
use crate::domain::Error;
use crate::domain::error::DiscoveryError;
use crate::domain::schema::{Shape, parse_with};

/// How the REST API base URL is located.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiscoveryStrategy {
    /// `HEAD` the site and read the `https://api.w.org/` relation from its
    /// `Link` header.
    #[default]
    Passive,
    /// `GET` `{site}{path}`, which answers with the base URL as a JSON string.
    Active {
        /// Path appended to the site URL, starting with `/`.
        path: String,
    },
}

/// Run `strategy` for `site_url`.
///
/// # Errors
/// [`Error::Discovery`] when the site is unreachable or, for passive
/// discovery, exposes no API link; the usual remote and schema errors
/// otherwise.
pub async fn discover(
    client: &Client,
    strategy: &DiscoveryStrategy,
    site_url: &str,
) -> Result<String, Error> {
    let site = Url::parse(site_url).map_err(|_| DiscoveryError::InvalidSiteUrl {
        url: site_url.to_owned(),
    })?;
    let api_url = match strategy {
        DiscoveryStrategy::Passive => passive(client, site).await?,
        DiscoveryStrategy::Active { path } => active(client, site_url, path).await?,
    };
    debug!(%api_url, "discovered REST API");
    Ok(api_url)
}

async fn passive(client: &Client, site: Url) -> Result<String, Error> {
    let response = client
        .head(site)
        .send()
        .await
        .map_err(site_unreachable)?;
    let status = response.status();
    if !status.is_success() {
        return Err(DiscoveryError::RequestFailed {
            status: status.as_u16(),
        }
        .into());
    }

    let links = response.headers().get_all(LINK);
    if links.iter().next().is_none() {
        return Err(DiscoveryError::MissingLinkHeader.into());
    }
    let values: Vec<&str> = links
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    api_link(&values.join(", ")).ok_or_else(|| DiscoveryError::NoApiLink.into())
}

fn site_unreachable(error: reqwest::Error) -> Error {
    let timed_out = error.is_timeout();
    warn!(error = %error, timed_out, "site unreachable during API discovery");
    DiscoveryError::Unreachable {
        message: error.to_string(),
        timed_out,
    }
    .into()
}

async fn active(client: &Client, site_url: &str, path: &str) -> Result<String, Error> {
    let endpoint = format!("{}{path}", site_url.trim_end_matches('/'));
    let response = client
        .get(endpoint)
        .send()
        .await
        .map_err(site_unreachable)?;
    handle_response(response, |value| {
        parse_with::<String>(&Shape::url(), value).map(|url| strip_trailing_slash(&url))
    })
    .await
}

/// Extract the REST API URL from a `Link` header value.
pub(crate) fn api_link(header: &str) -> Option<String> {
    api_link_pattern()
        .captures(header)
        .and_then(|captures| captures.get(1))
        .map(|url| strip_trailing_slash(url.as_str()))
}

fn strip_trailing_slash(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_owned()
}

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
fn api_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<([^>]+)>\s*;\s*rel="https://api\.w\.org/""#).expect("valid Link pattern")
    })
}
