//! Domain primitives, ports and services.
//!
//! Purpose: describe the WordPress session lifecycle independently of HTTP
//! frameworks and clients. Every value that crosses the network or storage
//! boundary is narrowed through [`schema`] before other code sees it.
//!
//! Public surface:
//! - Error (alias to `error::Error`): failure taxonomy shared by adapters.
//! - Session / User: authenticated context and identity.
//! - SessionCodec: opaque storage form of a session.
//! - AuthService / MediaService: use-cases over the `WordPressApi` port.

pub mod auth;
pub mod auth_service;
pub mod error;
pub mod media_service;
pub mod ports;
pub mod schema;
pub mod session;
pub mod session_codec;
pub mod session_lifecycle;
pub mod wordpress;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::auth_service::AuthService;
pub use self::error::{
    DiscoveryError, Error, RemoteApiError, SessionInvalid, SessionInvalidReason,
};
pub use self::media_service::MediaService;
pub use self::schema::SchemaViolation;
pub use self::session::{LOGIN_ROUTE, Outcome, Redirect, Session, User};
pub use self::session_codec::SessionCodec;
pub use self::session_lifecycle::{logout, require_session, store_session, validate_session};
