//! WordPress REST outbound adapter.
//!
//! This module provides the reqwest implementation of the `WordPressApi`
//! port, endpoint discovery, and the shared response handler.

mod discovery;
mod http_source;
mod response;

pub use discovery::DiscoveryStrategy;
pub use http_source::WordPressHttpApi;
pub use response::handle_response;
