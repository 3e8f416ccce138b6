//! Remote-owned WordPress REST entities.
//!
//! Each type declares its [`Shape`] so adapters can only obtain one through
//! [`crate::domain::schema::parse`]. Fields this service never reads are
//! still declared when the remote contract promises them; a response that
//! drops them is treated as a contract violation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{Schema, Shape, field, optional};

/// Literal code the token-validation endpoint returns for a live token.
pub const VALID_TOKEN_CODE: &str = "jwt_auth_valid_token";

/// Error body emitted by the WordPress REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpRestError {
    /// Machine-readable error code such as `rest_forbidden`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Embedded transport details.
    pub data: WpStatus,
}

/// `{ "status": <number> }` object embedded in several responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpStatus {
    /// HTTP status the remote reports for this payload.
    pub status: u16,
}

impl Schema for WpRestError {
    fn shape() -> Shape {
        Shape::object([
            field("code", Shape::string()),
            field("message", Shape::string()),
            field("data", Shape::object([field("status", Shape::number())])),
        ])
    }
}

/// Successful response of the JWT-auth token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpLoginData {
    /// E-mail address of the authenticated account.
    pub user_email: String,
    /// Display name; may be empty.
    pub user_display_name: String,
    /// URL-safe account name.
    pub user_nicename: String,
    /// Bearer token for subsequent calls.
    pub token: String,
}

impl WpLoginData {
    /// Display name, falling back to the nicename when it is empty.
    #[must_use]
    pub fn preferred_name(&self) -> &str {
        if self.user_display_name.trim().is_empty() {
            &self.user_nicename
        } else {
            &self.user_display_name
        }
    }
}

impl Schema for WpLoginData {
    fn shape() -> Shape {
        Shape::object([
            field("user_email", Shape::email()),
            field("user_display_name", Shape::string()),
            field("user_nicename", Shape::string()),
            field("token", Shape::string()),
        ])
    }
}

/// Affirmative answer of the token-validation endpoint.
///
/// Only `{ "code": "jwt_auth_valid_token", "data": { "status": 200 } }`
/// passes its shape; any other code or embedded status is a violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidToken {
    /// Always [`VALID_TOKEN_CODE`].
    pub code: String,
    /// Embedded status, always 200.
    pub data: WpStatus,
}

impl Schema for ValidToken {
    fn shape() -> Shape {
        Shape::object([
            field("code", Shape::literal(VALID_TOKEN_CODE)),
            field(
                "data",
                Shape::object([field("status", Shape::literal(200))]),
            ),
        ])
    }
}

/// `{ raw, rendered }` pair used by titles, captions and descriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpRendered {
    /// Stored value.
    pub raw: String,
    /// Value after WordPress filters.
    pub rendered: String,
}

fn rendered_shape(inner: &Shape) -> Shape {
    Shape::object([field("raw", inner.clone()), field("rendered", inner.clone())])
}

/// One link entry inside a `_links` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpLink {
    /// Target URL.
    pub href: String,
}

fn link_list_shape() -> Shape {
    Shape::array_of(Shape::object([field("href", Shape::url())]))
}

/// Uploaded attachment as returned by `POST /wp/v2/media`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpMediaItem {
    /// Attachment id.
    pub id: u64,
    /// Local publication date.
    pub date: String,
    /// Publication date in GMT.
    pub date_gmt: String,
    /// Caption.
    pub caption: WpRendered,
    /// Description.
    pub description: WpRendered,
    /// Globally unique identifier.
    pub guid: WpRendered,
    /// Attachment page URL.
    pub link: String,
    /// Attachment slug.
    pub slug: String,
    /// Public URL of the uploaded file.
    pub source_url: String,
    /// Title.
    pub title: WpRendered,
}

impl Schema for WpMediaItem {
    fn shape() -> Shape {
        let text = Shape::string();
        Shape::object([
            field("id", Shape::number()),
            field("date", Shape::string()),
            field("date_gmt", Shape::string()),
            field("caption", rendered_shape(&text)),
            field("description", rendered_shape(&text)),
            field("guid", rendered_shape(&Shape::url())),
            field("link", Shape::url()),
            field("slug", Shape::string()),
            field("source_url", Shape::url()),
            field("title", rendered_shape(&text)),
        ])
    }
}

/// `self`/`collection` link pair shared by users and terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpLinks {
    /// Canonical resource link.
    #[serde(rename = "self")]
    pub self_links: Vec<WpLink>,
    /// Parent collection link.
    pub collection: Vec<WpLink>,
}

fn links_shape() -> Shape {
    Shape::object([
        field("self", link_list_shape()),
        field("collection", link_list_shape()),
    ])
}

/// Authenticated profile returned by `/wp/v2/users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpUser {
    /// Avatar URLs keyed by pixel size (`"24"`, `"48"`, `"96"`).
    pub avatar_urls: BTreeMap<String, String>,
    /// Biography.
    pub description: String,
    /// User id.
    pub id: u64,
    /// Author archive URL.
    pub link: String,
    /// Registered user meta.
    #[serde(default)]
    pub meta: Option<BTreeMap<String, Value>>,
    /// Display name.
    pub name: String,
    /// URL-safe name.
    pub slug: String,
    /// Website declared in the profile.
    pub url: String,
    /// Hypermedia links.
    #[serde(rename = "_links")]
    pub links: WpLinks,
}

impl WpUser {
    /// URL of the largest avatar size.
    ///
    /// Keys are ordered by descending numeric value with a stable sort. The
    /// map is a `BTreeMap`, so equal sizes such as `"096"` and `"96"` are
    /// tie-broken by lexicographic key order rather than the order the remote
    /// sent them in. Keys that are not numbers sort after every numeric key.
    #[must_use]
    pub fn largest_avatar(&self) -> Option<&str> {
        let mut sizes: Vec<(Option<u32>, &String)> = self
            .avatar_urls
            .iter()
            .map(|(size, url)| (size.trim().parse::<u32>().ok(), url))
            .collect();
        sizes.sort_by(|left, right| right.0.cmp(&left.0));
        sizes.first().map(|(_, url)| url.as_str())
    }
}

impl Schema for WpUser {
    fn shape() -> Shape {
        Shape::object([
            field("avatar_urls", Shape::non_empty_record_of(Shape::url())),
            field("description", Shape::string()),
            field("id", Shape::number_min(1)),
            field("link", Shape::url()),
            optional("meta", Shape::record_of(Shape::Any)),
            field("name", Shape::non_empty_string()),
            field("slug", Shape::string()),
            field("url", Shape::url()),
            field("_links", links_shape()),
        ])
    }
}

/// Links advertised by a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpTaxonomyLinks {
    /// Taxonomy collection link.
    pub collection: Vec<WpLink>,
    /// Endpoint listing the taxonomy's terms.
    #[serde(rename = "wp:items")]
    pub items: Vec<WpLink>,
}

/// Taxonomy registered for attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpTaxonomy {
    /// Whether terms can have parents.
    pub hierarchical: bool,
    /// Description.
    pub description: String,
    /// Human-readable name.
    pub name: String,
    /// REST route base.
    pub rest_base: String,
    /// REST namespace.
    pub rest_namespace: String,
    /// Taxonomy slug.
    pub slug: String,
    /// Object types the taxonomy applies to.
    pub types: Vec<String>,
    /// Hypermedia links.
    #[serde(rename = "_links")]
    pub links: WpTaxonomyLinks,
}

impl WpTaxonomy {
    /// Endpoint that lists the terms of this taxonomy.
    #[must_use]
    pub fn terms_endpoint(&self) -> Option<&str> {
        self.links.items.first().map(|link| link.href.as_str())
    }
}

impl Schema for WpTaxonomy {
    fn shape() -> Shape {
        Shape::object([
            field("hierarchical", Shape::Bool),
            field("description", Shape::string()),
            field("name", Shape::string()),
            field("rest_base", Shape::string()),
            field("rest_namespace", Shape::string()),
            field("slug", Shape::string()),
            field("types", Shape::array_of(Shape::string())),
            field(
                "_links",
                Shape::object([
                    field("collection", link_list_shape()),
                    field("wp:items", link_list_shape()),
                ]),
            ),
        ])
    }
}

/// Attachment taxonomies keyed by slug.
pub type WpTaxonomies = BTreeMap<String, WpTaxonomy>;

/// Links advertised by a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpTermLinks {
    /// Canonical resource link.
    #[serde(rename = "self")]
    pub self_links: Vec<WpLink>,
    /// Parent collection link.
    pub collection: Vec<WpLink>,
    /// Taxonomy link.
    pub about: Vec<WpLink>,
}

/// One term of a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpTerm {
    /// Term id, at least 1.
    pub id: u64,
    /// Number of objects assigned to the term.
    pub count: u64,
    /// Description.
    pub description: String,
    /// Archive link.
    pub link: String,
    /// Human-readable name.
    pub name: String,
    /// Term slug.
    pub slug: String,
    /// Owning taxonomy slug.
    pub taxonomy: String,
    /// Parent term id, `0` for top-level terms.
    pub parent: u64,
    /// Hypermedia links.
    #[serde(rename = "_links")]
    pub links: WpTermLinks,
}

impl Schema for WpTerm {
    fn shape() -> Shape {
        Shape::object([
            field("id", Shape::number_min(1)),
            field("count", Shape::number()),
            field("description", Shape::string()),
            field("link", Shape::string()),
            field("name", Shape::string()),
            field("slug", Shape::string()),
            field("taxonomy", Shape::string()),
            field("parent", Shape::number()),
            field(
                "_links",
                links_shape().extend([field("about", link_list_shape())]),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for remote entity shapes.
    use super::*;
    use crate::domain::schema::{Constraint, parse};
    use rstest::rstest;
    use serde_json::json;

    fn links() -> Value {
        json!({
            "self": [{ "href": "https://example.com/wp-json/wp/v2/users/1" }],
            "collection": [{ "href": "https://example.com/wp-json/wp/v2/users" }]
        })
    }

    fn user_json(avatars: Value) -> Value {
        json!({
            "avatar_urls": avatars,
            "description": "",
            "id": 1,
            "link": "https://example.com/author/admin",
            "name": "Admin",
            "slug": "admin",
            "url": "https://example.com",
            "_links": links()
        })
    }

    #[rstest]
    fn largest_avatar_uses_numeric_order() {
        let user: WpUser = parse(user_json(json!({
            "24": "https://gravatar.test/24",
            "96": "https://gravatar.test/96",
            "128": "https://gravatar.test/128"
        })))
        .expect("valid user");
        assert_eq!(user.largest_avatar(), Some("https://gravatar.test/128"));
    }

    #[rstest]
    fn equal_sizes_resolve_by_lexicographic_key() {
        let user: WpUser = parse(user_json(json!({
            "096": "https://gravatar.test/first",
            "96": "https://gravatar.test/second",
            "small": "https://gravatar.test/small"
        })))
        .expect("valid user");
        assert_eq!(user.largest_avatar(), Some("https://gravatar.test/first"));
    }

    #[rstest]
    fn empty_avatar_map_is_a_violation() {
        let err = parse::<WpUser>(user_json(json!({}))).expect_err("no avatars");
        assert_eq!(err.path().to_string(), "$.avatar_urls");
        assert_eq!(err.constraint(), &Constraint::NonEmpty);
    }

    #[rstest]
    #[case("jwt_auth_valid_token", json!(200), true)]
    #[case("jwt_auth_valid_token", json!(403), false)]
    #[case("jwt_auth_invalid_token", json!(200), false)]
    #[case("jwt_auth_valid_token", json!("200"), false)]
    fn valid_token_needs_exact_code_and_status(
        #[case] code: &str,
        #[case] status: Value,
        #[case] accepted: bool,
    ) {
        let result = parse::<ValidToken>(json!({ "code": code, "data": { "status": status } }));
        assert_eq!(result.is_ok(), accepted);
    }

    #[rstest]
    #[case("Jane Doe", "jane", "Jane Doe")]
    #[case("", "jane", "jane")]
    #[case("   ", "jane", "jane")]
    fn preferred_name_falls_back_to_nicename(
        #[case] display: &str,
        #[case] nicename: &str,
        #[case] expected: &str,
    ) {
        let data: WpLoginData = parse(json!({
            "user_email": "jane@example.com",
            "user_display_name": display,
            "user_nicename": nicename,
            "token": "t"
        }))
        .expect("valid login data");
        assert_eq!(data.preferred_name(), expected);
    }

    #[rstest]
    fn taxonomy_exposes_its_terms_endpoint() {
        let taxonomy: WpTaxonomy = parse(json!({
            "hierarchical": true,
            "description": "",
            "name": "Media Categories",
            "rest_base": "media_category",
            "rest_namespace": "wp/v2",
            "slug": "media_category",
            "types": ["attachment"],
            "_links": {
                "collection": [{ "href": "https://example.com/wp-json/wp/v2/taxonomies" }],
                "wp:items": [{ "href": "https://example.com/wp-json/wp/v2/media_category" }]
            }
        }))
        .expect("valid taxonomy");
        assert_eq!(
            taxonomy.terms_endpoint(),
            Some("https://example.com/wp-json/wp/v2/media_category")
        );
    }

    #[rstest]
    fn term_ids_must_be_positive() {
        let err = parse::<Vec<WpTerm>>(json!([{
            "id": 0,
            "count": 0,
            "description": "",
            "link": "https://example.com/c/x",
            "name": "X",
            "slug": "x",
            "taxonomy": "category",
            "parent": 0,
            "_links": {
                "self": [{ "href": "https://example.com/a" }],
                "collection": [{ "href": "https://example.com/b" }],
                "about": [{ "href": "https://example.com/c" }]
            }
        }]))
        .expect_err("id 0 is invalid");
        assert_eq!(err.path().to_string(), "$[0].id");
    }
}
