use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use bytebites::config::AppConfig;
use bytebites::messaging::run_order_events_consumer;
use bytebites::metrics::{health_handler, metrics_handler, ServiceInfo};
use bytebites::notifications::NotificationListener;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    bytebites::init_tracing("info,bytebites=debug");

    let config = AppConfig::from_env(8084);
    tracing::info!(bind = %config.bind_addr, "🚀 starting notification-service");

    let brokers = config.kafka_brokers.clone();
    tokio::spawn(async move {
        if let Err(e) = run_order_events_consumer(
            &brokers,
            "notification-service",
            Arc::new(NotificationListener),
        )
        .await
        {
            tracing::error!(error = %e, "order events consumer terminated");
        }
    });

    let registry = web::Data::new(Arc::new(prometheus::Registry::new()));
    let info = web::Data::new(ServiceInfo {
        name: "notification-service",
    });

    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            .app_data(info.clone())
            .route("/metrics", web::get().to(metrics_handler))
            .route("/health", web::get().to(health_handler))
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await?;

    Ok(())
}
