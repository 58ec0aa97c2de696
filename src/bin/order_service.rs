use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use bytebites::auth::TokenVerifier;
use bytebites::clients::{GuardedRestaurantDirectory, HttpRestaurantDirectory};
use bytebites::config::AppConfig;
use bytebites::messaging::KafkaEventPublisher;
use bytebites::metrics::{health_handler, metrics_handler, Metrics, ServiceInfo};
use bytebites::orders::{handlers, OrderService, PgOrderStore, ORDER_EVENTS_TOPIC};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    bytebites::init_tracing("info,bytebites=debug");

    let config = AppConfig::from_env(8083);
    tracing::info!(bind = %config.bind_addr, "🚀 starting order-service");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let store = PgOrderStore::new(pool);
    store.init_schema().await?;

    let metrics = Arc::new(Metrics::new()?);
    let registry = web::Data::new(Arc::new(metrics.registry().clone()));

    // Directory lookups go through the circuit breaker; while it is open the
    // workflow runs on fallback data instead of hard-failing.
    let directory = GuardedRestaurantDirectory::new(HttpRestaurantDirectory::new(
        config.restaurant_service_url.clone(),
    ));

    let publisher = KafkaEventPublisher::new(&config.kafka_brokers, ORDER_EVENTS_TOPIC);

    let verifier = TokenVerifier::new(&config.jwt_secret);
    let service = web::Data::new(OrderService::new(
        Arc::new(store),
        Arc::new(directory),
        Arc::new(publisher),
        metrics,
    ));

    let info = web::Data::new(ServiceInfo {
        name: "order-service",
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
