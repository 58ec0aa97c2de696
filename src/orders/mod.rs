// ============================================================================
// Order Workflow
// ============================================================================
//
// The order aggregate, its lifecycle state machine, the creation
// orchestrator, and the Postgres-backed store.
//
// ============================================================================

pub mod events;
pub mod handlers;
pub mod model;
pub mod repository;
pub mod service;

pub use events::{OrderItemDetails, OrderPlacedEvent, ORDER_EVENTS_TOPIC};
pub use model::{Order, OrderItem, OrderStatus, OrderSummary};
pub use repository::{OrderStore, PgOrderStore};
pub use service::{OrderItemRequest, OrderRequest, OrderService, OrderStatusUpdateRequest};
