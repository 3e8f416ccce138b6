//! Session and REST plumbing for uploading media to WordPress sites.
//!
//! - [`domain`]: sessions, the storage codec, schema checks and the
//!   login/upload services.
//! - [`outbound`]: the reqwest adapter for a site's REST API.
//! - [`inbound`]: Actix handlers, the session cookie jar and configuration.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use middleware::Trace;
