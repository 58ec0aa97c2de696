use actix_web::{web, HttpResponse, Responder};
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;

/// Name of the service exposing the endpoints, reported by /health.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: &'static str,
}

pub async fn metrics_handler(registry: web::Data<Arc<Registry>>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

pub async fn health_handler(info: web::Data<ServiceInfo>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": info.name
    }))
}
