//! Domain ports and supporting types for the hexagonal boundary.

mod session_jar;
mod wordpress_api;

pub use session_jar::{FixtureSessionJar, SessionJar};
#[cfg(test)]
pub use wordpress_api::MockWordPressApi;
pub use wordpress_api::{MediaUpload, WordPressApi};
