use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use bytebites::auth::{handlers, AuthService, PgUserStore, TokenIssuer, TokenVerifier};
use bytebites::config::AppConfig;
use bytebites::metrics::{health_handler, metrics_handler, ServiceInfo};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    bytebites::init_tracing("info,bytebites=debug");

    let config = AppConfig::from_env(8081);
    tracing::info!(bind = %config.bind_addr, "🚀 starting auth-service");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let store = PgUserStore::new(pool);
    store.init_schema().await?;

    let issuer = TokenIssuer::new(&config.jwt_secret, config.token_ttl_secs);
    let verifier = TokenVerifier::new(&config.jwt_secret);
    let service = web::Data::new(AuthService::new(Arc::new(store), issuer));

    let registry = web::Data::new(Arc::new(prometheus::Registry::new()));
    let info = web::Data::new(ServiceInfo {
        name: "auth-service",
    });

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(web::Data::new(verifier.clone()))
            .app_data(registry.clone())
            .app_data(info.clone())
            .configure(handlers::configure)
            .route("/metrics", web::get().to(metrics_handler))
            .route("/health", web::get().to(health_handler))
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await?;

    Ok(())
}
