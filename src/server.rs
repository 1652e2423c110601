mod app_state;
mod cors_policy;
mod extractors;
mod handlers;
mod security_headers;

pub use self::{app_state::AppState, extractors::AuthenticatedUser};
use crate::{
    config::Config,
    credentials::ConnectionCredentialsStore,
    database::Database,
    network::create_http_client,
    proxy::{CredentialsResolver, Forwarder, MultiTenancy},
    server::{cors_policy::CorsPolicy, security_headers::security_headers},
};
use actix_web::{App, HttpServer, middleware::from_fn, web};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
pub async fn run(config: Config, http_port: u16) -> Result<(), anyhow::Error> {
    let http_client = create_http_client(&config.http.client)?;

    let store: Option<Arc<dyn ConnectionCredentialsStore>> = match config.db {
        Some(ref db_config) => Some(Arc::new(Database::connect(db_config).await?)),
        None => None,
    };

    let resolver = CredentialsResolver::new(
        &config.automation,
        MultiTenancy::configure(&config, store, http_client.clone()),
    );
    if resolver.multi_tenancy().is_none() && !resolver.has_fallback() {
        warn!(
            "Neither multi-tenant mode nor fallback credentials are configured, proxy requests will be rejected."
        );
    }

    let forwarder = Forwarder::new(&config.automation, http_client)?;
    let cors_policy = web::Data::new(CorsPolicy::new(&config));
    let state = web::Data::new(AppState::new(config, resolver, forwarder));

    let http_server_url = format!("0.0.0.0:{http_port}");
    let http_server = HttpServer::new(move || {
        App::new()
            .wrap(from_fn(security_headers))
            .wrap(TracingLogger::default())
            .app_data(cors_policy.clone())
            .app_data(state.clone())
            .configure(configure_routes)
    });

    let http_server = http_server
        .bind(&http_server_url)
        .with_context(|| format!("Failed to bind to {}.", &http_server_url))?;

    info!("Flowgate API server is available at http://{http_server_url}");

    http_server
        .run()
        .await
        .with_context(|| "Failed to run Flowgate API server.")
}

/// Registers API routes.
pub fn configure_routes(config: &mut web::ServiceConfig) {
    config.service(
        web::scope("/api")
            .route("/status", web::get().to(handlers::status_get))
            .service(
                web::resource("/credentials")
                    .route(web::get().to(handlers::credentials_get))
                    .route(web::post().to(handlers::credentials_set))
                    .route(web::put().to(handlers::credentials_set))
                    .route(web::delete().to(handlers::credentials_remove)),
            )
            .route("/proxy/{path:.*}", web::route().to(handlers::proxy_forward)),
    );
}
