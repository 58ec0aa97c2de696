use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Write as _;

use crate::messaging::OrderPlacedHandler;
use crate::orders::events::OrderPlacedEvent;

// ============================================================================
// Order Event Subscribers
// ============================================================================
//
// Two handlers for the order events topic: the customer notification and
// the restaurant-side fulfillment kickoff. Delivery here is a simulated
// send, logged in full.
//
// ============================================================================

/// Formats and "sends" the customer notification.
pub struct NotificationListener;

#[async_trait]
impl OrderPlacedHandler for NotificationListener {
    async fn handle(&self, event: OrderPlacedEvent) -> Result<()> {
        tracing::info!(order_id = %event.order_id, user = %event.user_email, "received order-placed event");

        let (subject, body) = format_notification(&event);

        tracing::info!(recipient = %event.user_email, %subject, "simulating notification send");
        tracing::info!("{}", body);
        Ok(())
    }
}

pub fn format_notification(event: &OrderPlacedEvent) -> (String, String) {
    let subject = format!("Your ByteBites Order #{} has been placed!", event.order_id);

    let mut items = String::new();
    for item in &event.items {
        let _ = writeln!(
            items,
            "- {} x {} ({})",
            item.menu_item_name, item.quantity, item.price
        );
    }

    let body = format!(
        "Dear {},\n\n\
         Your order from {} has been successfully placed.\n\
         Order ID: {}\n\
         Total Amount: {}\n\
         Delivery Address: {}\n\n\
         We will notify you when your order is out for delivery.\n\
         Thank you for choosing ByteBites!\n\n\
         Your Order Items:\n{}",
        event.user_email,
        event.restaurant_name,
        event.order_id,
        event.total_amount,
        event.delivery_address,
        items
    );

    (subject, body)
}

/// Restaurant-side subscriber: kicks off preparation for incoming orders.
pub struct FulfillmentListener;

#[async_trait]
impl OrderPlacedHandler for FulfillmentListener {
    async fn handle(&self, event: OrderPlacedEvent) -> Result<()> {
        tracing::info!(
            order_id = %event.order_id,
            restaurant_id = %event.restaurant_id,
            restaurant = %event.restaurant_name,
            "starting preparation for order"
        );

        for item in &event.items {
            tracing::info!(
                order_id = %event.order_id,
                item = %item.menu_item_name,
                quantity = item.quantity,
                "preparing item"
            );
        }
        Ok(())
    }
}
