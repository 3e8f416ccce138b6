//! Server construction and middleware wiring.

mod config;

pub use config::{ServerConfig, ServerConfigError};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use wp_uploader::Trace;
use wp_uploader::domain::SessionCodec;
use wp_uploader::inbound::http::auth::{current_session, login, logout};
use wp_uploader::inbound::http::error::json_error_handler;
use wp_uploader::inbound::http::health::{HealthState, live, ready};
use wp_uploader::inbound::http::media::{taxonomies, taxonomy_terms, upload_media};
use wp_uploader::inbound::http::session::CookiePolicy;
use wp_uploader::inbound::http::session_config::fingerprint::secret_fingerprint;
use wp_uploader::inbound::http::state::HttpState;
use wp_uploader::outbound::wordpress::WordPressHttpApi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    max_upload_bytes: usize,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        max_upload_bytes,
    } = deps;

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::PayloadConfig::new(max_upload_bytes))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(Trace)
        .service(login)
        .service(current_session)
        .service(logout)
        .service(upload_media)
        .service(taxonomies)
        .service(taxonomy_terms)
        .service(ready)
        .service(live)
}

fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let api = WordPressHttpApi::new(config.http_timeout, config.discovery.clone())
        .map_err(|err| std::io::Error::other(format!("failed to build HTTP client: {err}")))?;
    let cookies = CookiePolicy {
        secure: config.session.cookie_secure,
        same_site: config.session.same_site,
    };
    Ok(
        HttpState::new(Arc::new(api), SessionCodec::new(&config.session.secret), cookies)
            .with_default_site_url(config.default_site_url.clone()),
    )
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when the HTTP client cannot be built or the
/// socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: &ServerConfig,
) -> std::io::Result<Server> {
    info!(
        secret_fingerprint = %secret_fingerprint(&config.session.secret),
        cookie_secure = config.session.cookie_secure,
        discovery = ?config.discovery,
        "session configuration loaded"
    );
    let http_state = web::Data::new(build_http_state(config)?);
    let max_upload_bytes = config.max_upload_bytes;
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            max_upload_bytes,
        })
    })
    .bind(config.bind_addr())?
    .run();

    info!(bind_addr = %config.bind_addr(), "server listening");
    health_state.mark_ready();
    Ok(server)
}
