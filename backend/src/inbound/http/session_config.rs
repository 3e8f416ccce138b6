//! Session configuration parsing and validation.
//!
//! This module centralises the environment-driven session settings so they are
//! validated consistently and can be tested in isolation.

pub mod fingerprint;
mod parsing;

use std::path::PathBuf;

use actix_web::cookie::SameSite;
use chacha20poly1305::ChaCha20Poly1305;
use chacha20poly1305::aead::{KeyInit, OsRng};
use mockable::Env;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;
use zeroize::Zeroize;

use self::parsing::{BoolEnvConfig, debug_warn_or_error, parse_bool_env, parse_same_site_value};

pub(crate) const SECRET_ENV: &str = "APP_SECRET";
pub(crate) const SECRET_FILE_ENV: &str = "APP_SECRET_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "SESSION_SAMESITE";
/// Minimum secret length accepted by release builds.
pub const SECRET_MIN_LEN: usize = 32;

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wp_uploader::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub(crate) fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Session settings derived from configuration toggles.
#[derive(Debug)]
pub struct SessionSettings {
    /// Process-wide secret the session codec derives its key from.
    pub secret: SecretString,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Configured `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the secret file failed.
    #[error("failed to read session secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The secret is too short for release builds.
    #[error("session secret too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
    /// `SameSite=None` requires a secure cookie setting in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
}

/// Build session settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use wp_uploader::inbound::http::session_config::{
///     session_settings_from_env, BuildMode,
/// };
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut env = MockEnv::new();
/// env.expect_string()
///     .returning(|name| match name {
///         "APP_SECRET" => Some("x".repeat(32)),
///         "SESSION_COOKIE_SECURE" => Some("1".to_string()),
///         "SESSION_SAMESITE" => Some("Strict".to_string()),
///         _ => None,
///     });
///
/// let settings = session_settings_from_env(&env, BuildMode::Release)?;
/// assert!(settings.cookie_secure);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`SessionConfigError`] when a release build is missing the secret
/// or any toggle holds an invalid value.
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = parse_bool_env(
        env,
        mode,
        BoolEnvConfig::new(COOKIE_SECURE_ENV, !mode.is_debug()),
    )?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let secret = secret_from_env(env, mode)?;

    Ok(SessionSettings {
        secret,
        cookie_secure,
        same_site,
    })
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    match env.string(SAMESITE_ENV) {
        Some(value) => parse_same_site_value(&value, mode, cookie_secure, SameSite::Lax),
        None => Ok(SameSite::Lax),
    }
}

fn secret_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<SecretString, SessionConfigError> {
    let secret = if let Some(value) = env.string(SECRET_ENV) {
        SecretString::from(value)
    } else if let Some(path) = env.string(SECRET_FILE_ENV) {
        read_secret_file(PathBuf::from(path))?
    } else {
        return debug_warn_or_error(
            mode,
            (),
            SessionConfigError::MissingEnv { name: SECRET_ENV },
            || warn!("APP_SECRET not set; using temporary session secret (dev only)"),
        )
        .map(|()| ephemeral_secret());
    };

    let length = secret.expose_secret().len();
    if length < SECRET_MIN_LEN {
        debug_warn_or_error(
            mode,
            (),
            SessionConfigError::SecretTooShort {
                length,
                min_len: SECRET_MIN_LEN,
            },
            || warn!(length, "session secret shorter than recommended"),
        )?;
    }
    Ok(secret)
}

fn read_secret_file(path: PathBuf) -> Result<SecretString, SessionConfigError> {
    match std::fs::read_to_string(&path) {
        Ok(mut contents) => {
            let secret = SecretString::from(contents.trim_end_matches(['\r', '\n']).to_owned());
            contents.zeroize();
            Ok(secret)
        }
        Err(source) => Err(SessionConfigError::SecretRead { path, source }),
    }
}

fn ephemeral_secret() -> SecretString {
    let mut key = ChaCha20Poly1305::generate_key(&mut OsRng);
    let secret = SecretString::from(hex::encode(key.as_slice()));
    key.as_mut_slice().zeroize();
    secret
}
