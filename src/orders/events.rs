use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::orders::model::Order;

// ============================================================================
// Order Events
// ============================================================================
//
// The order-placed event published after an order commits, keyed by order id
// and consumed by the notification and restaurant-fulfillment subscribers.
//
// ============================================================================

pub const ORDER_EVENTS_TOPIC: &str = "order-events-topic";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetails {
    pub menu_item_id: Uuid,
    pub menu_item_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPlacedEvent {
    pub order_id: Uuid,
    pub user_email: String,
    pub restaurant_id: Uuid,
    pub restaurant_name: String,
    pub total_amount: Decimal,
    pub delivery_address: String,
    pub order_date: DateTime<Utc>,
    pub items: Vec<OrderItemDetails>,
}

impl OrderPlacedEvent {
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id,
            user_email: order.user_email.clone(),
            restaurant_id: order.restaurant_id,
            restaurant_name: order.restaurant_name.clone(),
            total_amount: order.total_amount,
            delivery_address: order.delivery_address.clone(),
            order_date: order.order_date,
            items: order
                .items
                .iter()
                .map(|item| OrderItemDetails {
                    menu_item_id: item.menu_item_id,
                    menu_item_name: item.menu_item_name.clone(),
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
        }
    }
}
