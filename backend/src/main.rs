//! Backend entry-point: reads configuration and starts the HTTP server.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use wp_uploader::inbound::http::health::HealthState;
use wp_uploader::inbound::http::session_config::BuildMode;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = ServerConfig::from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|err| {
            error!(error = %err, "invalid configuration");
            std::io::Error::other(err)
        })?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), &config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
