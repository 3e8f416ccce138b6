//! HTTP server configuration read from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use mockable::Env;
use tracing::warn;
use wp_uploader::inbound::http::session_config::{
    BuildMode, SessionConfigError, SessionSettings, session_settings_from_env,
};
use wp_uploader::outbound::wordpress::DiscoveryStrategy;

pub(crate) const BIND_ADDR_ENV: &str = "BIND_ADDR";
pub(crate) const HTTP_TIMEOUT_ENV: &str = "HTTP_TIMEOUT_SECS";
pub(crate) const DISCOVERY_ENV: &str = "WP_DISCOVERY";
pub(crate) const DISCOVERY_PATH_ENV: &str = "WP_DISCOVERY_PATH";
pub(crate) const DEFAULT_SITE_ENV: &str = "WP_URL";
pub(crate) const MAX_UPLOAD_ENV: &str = "MAX_UPLOAD_BYTES";

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Errors raised while reading server configuration.
#[derive(thiserror::Error, Debug)]
pub enum ServerConfigError {
    /// Session toggles or the secret were rejected.
    #[error(transparent)]
    Session(#[from] SessionConfigError),
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// A variable required by another setting is missing.
    #[error("{name} is required when {required_by}")]
    MissingEnv {
        name: &'static str,
        required_by: &'static str,
    },
}

/// Everything the server needs before it binds.
#[derive(Debug)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_timeout: Duration,
    pub(crate) discovery: DiscoveryStrategy,
    pub(crate) default_site_url: Option<String>,
    pub(crate) max_upload_bytes: usize,
    pub(crate) session: SessionSettings,
}

impl ServerConfig {
    /// Read configuration from `env`.
    ///
    /// Invalid values fall back to defaults with a warning in debug builds
    /// and are rejected in release builds.
    ///
    /// # Errors
    /// [`ServerConfigError`] for rejected values, a missing discovery path,
    /// or invalid session settings.
    pub fn from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Self, ServerConfigError> {
        let bind_addr = parsed_or_default(
            env,
            mode,
            BIND_ADDR_ENV,
            "a socket address such as 0.0.0.0:8080",
            DEFAULT_BIND_ADDR,
        )?;
        let timeout_secs = parsed_or_default(
            env,
            mode,
            HTTP_TIMEOUT_ENV,
            "a whole number of seconds",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let max_upload_bytes = parsed_or_default(
            env,
            mode,
            MAX_UPLOAD_ENV,
            "a byte count",
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        Ok(Self {
            bind_addr,
            http_timeout: Duration::from_secs(timeout_secs),
            discovery: discovery_from_env(env, mode)?,
            default_site_url: env
                .string(DEFAULT_SITE_ENV)
                .filter(|value| !value.trim().is_empty()),
            max_upload_bytes,
            session: session_settings_from_env(env, mode)?,
        })
    }

    /// Socket address the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

fn discovery_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<DiscoveryStrategy, ServerConfigError> {
    let Some(value) = env.string(DISCOVERY_ENV) else {
        return Ok(DiscoveryStrategy::Passive);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "passive" => Ok(DiscoveryStrategy::Passive),
        "active" => {
            let path = env
                .string(DISCOVERY_PATH_ENV)
                .filter(|path| path.starts_with('/'))
                .ok_or(ServerConfigError::MissingEnv {
                    name: DISCOVERY_PATH_ENV,
                    required_by: "WP_DISCOVERY=active",
                })?;
            Ok(DiscoveryStrategy::Active { path })
        }
        _ => invalid_or_default(
            mode,
            DiscoveryStrategy::Passive,
            DISCOVERY_ENV,
            value,
            "passive|active",
        ),
    }
}

fn parsed_or_default<E: Env, T: FromStr>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ServerConfigError> {
    let Some(value) = env.string(name) else {
        return Ok(default);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(_) => invalid_or_default(mode, default, name, value, expected),
    }
}

fn invalid_or_default<T>(
    mode: BuildMode,
    fallback: T,
    name: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ServerConfigError> {
    if mode == BuildMode::Debug {
        warn!(%value, "invalid {name}; using default");
        Ok(fallback)
    } else {
        Err(ServerConfigError::InvalidEnv {
            name,
            value,
            expected,
        })
    }
}
