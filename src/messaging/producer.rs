use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};

use crate::orders::events::OrderPlacedEvent;

// ============================================================================
// Event Publisher
// ============================================================================
//
// Publishes order-placed events keyed by order id. Delivery is
// at-least-once: the orchestrator publishes after its transaction commits
// and treats a failed send as a logged loss for the channel to recover.
//
// ============================================================================

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_order_placed(&self, event: &OrderPlacedEvent) -> Result<()>;
}

pub struct KafkaEventPublisher {
    producer: FutureProducer,
    topic: String,
}

impl KafkaEventPublisher {
    pub fn new(brokers: &str, topic: &str) -> Self {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .expect("Failed to create Kafka producer");

        Self {
            producer,
            topic: topic.to_string(),
        }
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish_order_placed(&self, event: &OrderPlacedEvent) -> Result<()> {
        let key = event.order_id.to_string();
        let payload = serde_json::to_string(event)?;

        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);

        self.producer
            .send(record, rdkafka::util::Timeout::After(Duration::from_secs(5)))
            .await
            .map_err(|(e, _)| anyhow::anyhow!("Kafka send error: {}", e))?;

        tracing::info!(
            topic = %self.topic,
            order_id = %event.order_id,
            "published order-placed event"
        );
        Ok(())
    }
}
