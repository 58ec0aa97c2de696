use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use bytebites::auth::TokenVerifier;
use bytebites::config::AppConfig;
use bytebites::messaging::run_order_events_consumer;
use bytebites::metrics::{health_handler, metrics_handler, ServiceInfo};
use bytebites::notifications::FulfillmentListener;
use bytebites::restaurants::{handlers, PgRestaurantStore, RestaurantService};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    bytebites::init_tracing("info,bytebites=debug");

    let config = AppConfig::from_env(8082);
    tracing::info!(bind = %config.bind_addr, "🚀 starting restaurant-service");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    let store = PgRestaurantStore::new(pool);
    store.init_schema().await?;

    let verifier = TokenVerifier::new(&config.jwt_secret);
    let service = web::Data::new(RestaurantService::new(Arc::new(store)));

    // Restaurant-side fulfillment: watch the order events topic and kick off
    // preparation for incoming orders.
    let brokers = config.kafka_brokers.clone();
    tokio::spawn(async move {
        if let Err(e) =
            run_order_events_consumer(&brokers, "restaurant-service", Arc::new(FulfillmentListener))
                .await
        {
            tracing::error!(error = %e, "order events consumer terminated");
        }
    });

    let registry = web::Data::new(Arc::new(prometheus::Registry::new()));
    let info = web::Data::new(ServiceInfo {
        name: "restaurant-service",
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
