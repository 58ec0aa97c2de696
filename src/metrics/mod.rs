mod server;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

pub use server::{health_handler, metrics_handler, ServiceInfo};

// ============================================================================
// Metrics
// ============================================================================
//
// Prometheus counters for the order workflow, registered with a per-process
// registry and scraped via each service's /metrics endpoint.
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub orders_created: IntCounter,
    pub orders_failed: IntCounterVec,
    pub order_create_duration: Histogram,

    pub events_published: IntCounter,
    pub events_publish_failed: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_failed = IntCounterVec::new(
            Opts::new("orders_failed_total", "Order creations that failed"),
            &["reason"],
        )?;
        registry.register(Box::new(orders_failed.clone()))?;

        let order_create_duration = Histogram::with_opts(
            HistogramOpts::new(
                "order_create_duration_seconds",
                "End-to-end order creation duration",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(order_create_duration.clone()))?;

        let events_published = IntCounter::new(
            "order_events_published_total",
            "Order-placed events published",
        )?;
        registry.register(Box::new(events_published.clone()))?;

        let events_publish_failed = IntCounter::new(
            "order_events_publish_failed_total",
            "Order-placed events that failed to publish",
        )?;
        registry.register(Box::new(events_publish_failed.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            orders_failed,
            order_create_duration,
            events_published,
            events_publish_failed,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
