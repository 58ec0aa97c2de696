// ============================================================================
// Event Channel
// ============================================================================
//
// Kafka producer and consumer for the order events topic.
//
// ============================================================================

pub mod consumer;
pub mod producer;

pub use consumer::{run_order_events_consumer, OrderPlacedHandler};
pub use producer::{EventPublisher, KafkaEventPublisher};
