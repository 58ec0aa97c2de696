use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;

use crate::orders::events::{OrderPlacedEvent, ORDER_EVENTS_TOPIC};

// ============================================================================
// Order Events Consumer
// ============================================================================

/// Subscriber-side handler for order-placed events.
#[async_trait]
pub trait OrderPlacedHandler: Send + Sync {
    async fn handle(&self, event: OrderPlacedEvent) -> Result<()>;
}

/// Consume the order events topic forever, dispatching each decoded event.
/// Malformed payloads are logged and skipped; handler errors are logged and
/// the loop keeps going.
pub async fn run_order_events_consumer(
    brokers: &str,
    group_id: &str,
    handler: Arc<dyn OrderPlacedHandler>,
) -> Result<()> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("group.id", group_id)
        .set("bootstrap.servers", brokers)
        .set("enable.partition.eof", "false")
        .set("session.timeout.ms", "6000")
        .set("auto.offset.reset", "earliest")
        .create()?;

    consumer.subscribe(&[ORDER_EVENTS_TOPIC])?;
    tracing::info!(
        topic = ORDER_EVENTS_TOPIC,
        group = %group_id,
        "listening for order events"
    );

    loop {
        match consumer.recv().await {
            Err(e) => {
                tracing::error!(error = %e, "Kafka receive error");
            }
            Ok(message) => {
                let Some(Ok(payload)) = message.payload_view::<str>() else {
                    tracing::warn!("skipping order event without utf-8 payload");
                    continue;
                };

                match serde_json::from_str::<OrderPlacedEvent>(payload) {
                    Ok(event) => {
                        let order_id = event.order_id;
                        if let Err(e) = handler.handle(event).await {
                            tracing::error!(%order_id, error = %e, "order event handler failed");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping malformed order event");
                    }
                }
            }
        }
    }
}
