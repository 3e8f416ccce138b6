//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **wordpress**: reqwest client for a WordPress site's REST API
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod wordpress;
