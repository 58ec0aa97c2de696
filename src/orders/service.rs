use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{Identity, Role};
use crate::clients::{MenuItemSnapshot, RestaurantDirectory};
use crate::error::ServiceError;
use crate::messaging::EventPublisher;
use crate::metrics::Metrics;
use crate::orders::events::OrderPlacedEvent;
use crate::orders::model::{Order, OrderItem, OrderStatus, OrderSummary};
use crate::orders::repository::OrderStore;

// ============================================================================
// Order Creation Orchestrator
// ============================================================================
//
// Given an identity, a restaurant, an address and a list of item requests:
// validate, resolve the restaurant and menu items through the guarded
// directory client, compute the total with exact decimal arithmetic, persist
// the aggregate atomically, then publish the order-placed event. Publish
// failure after commit never rolls the order back; the channel redelivers on
// its own schedule.
//
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub restaurant_id: Uuid,
    pub delivery_address: String,
    pub order_items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdateRequest {
    pub new_status: OrderStatus,
}

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    directory: Arc<dyn RestaurantDirectory>,
    publisher: Arc<dyn EventPublisher>,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        directory: Arc<dyn RestaurantDirectory>,
        publisher: Arc<dyn EventPublisher>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            store,
            directory,
            publisher,
            metrics,
        }
    }

    pub async fn create_order(
        &self,
        identity: &Identity,
        request: &OrderRequest,
    ) -> Result<Order, ServiceError> {
        match self.create_order_inner(identity, request).await {
            Ok(order) => {
                self.metrics.orders_created.inc();
                Ok(order)
            }
            Err(err) => {
                self.metrics
                    .orders_failed
                    .with_label_values(&[err.kind()])
                    .inc();
                Err(err)
            }
        }
    }

    async fn create_order_inner(
        &self,
        identity: &Identity,
        request: &OrderRequest,
    ) -> Result<Order, ServiceError> {
        validate_request(request)?;

        let _timer = self.metrics.order_create_duration.start_timer();
        let restaurant_id = request.restaurant_id;

        tracing::info!(%restaurant_id, user = %identity.email, "creating order");

        // Step 1: resolve the restaurant. The guarded client answers with
        // fallback data while the directory is unhealthy; a genuine miss
        // propagates as not-found.
        let restaurant = self.directory.restaurant(restaurant_id).await?;

        // Step 2: resolve menu items, deduplicated and fanned out
        // concurrently. One missing item fails the whole order.
        let mut menu_item_ids: Vec<Uuid> = request
            .order_items
            .iter()
            .map(|item| item.menu_item_id)
            .collect();
        menu_item_ids.sort_unstable();
        menu_item_ids.dedup();

        let lookups = menu_item_ids.iter().map(|&menu_item_id| {
            let directory = Arc::clone(&self.directory);
            async move {
                directory
                    .menu_item(restaurant_id, menu_item_id)
                    .await
                    .map(|snapshot| (menu_item_id, snapshot))
            }
        });
        let menu_items: HashMap<Uuid, MenuItemSnapshot> =
            future::try_join_all(lookups).await?.into_iter().collect();

        // Step 3: line items and total, exact fixed-point arithmetic.
        let now = Utc::now();
        let mut items = Vec::with_capacity(request.order_items.len());
        let mut total_amount = Decimal::ZERO;

        for item_request in &request.order_items {
            let snapshot = menu_items.get(&item_request.menu_item_id).ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Menu item not found with ID: {}",
                    item_request.menu_item_id
                ))
            })?;

            total_amount += snapshot.price * Decimal::from(item_request.quantity);
            items.push(OrderItem {
                id: Uuid::new_v4(),
                menu_item_id: snapshot.id,
                menu_item_name: snapshot.name.clone(),
                quantity: item_request.quantity,
                price: snapshot.price,
            });
        }

        // Step 4: persist the aggregate atomically.
        let order = Order {
            id: Uuid::new_v4(),
            user_id: identity.user_id,
            user_email: identity.email.clone(),
            restaurant_id,
            restaurant_name: restaurant.name,
            items,
            total_amount,
            status: OrderStatus::Pending,
            delivery_address: request.delivery_address.clone(),
            order_date: now,
            last_updated: now,
        };
        self.store.insert(&order).await?;

        // Step 5: publish. The order is already durable; a publish failure
        // is logged and surfaced to the channel's own delivery guarantees.
        let event = OrderPlacedEvent::from_order(&order);
        match self.publisher.publish_order_placed(&event).await {
            Ok(()) => self.metrics.events_published.inc(),
            Err(e) => {
                self.metrics.events_publish_failed.inc();
                tracing::warn!(order_id = %order.id, error = %e, "order persisted but event publish failed");
            }
        }

        tracing::info!(order_id = %order.id, total = %order.total_amount, "order created");
        Ok(order)
    }

    pub async fn get_order(
        &self,
        identity: &Identity,
        order_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let order = self.load(order_id).await?;
        ensure_owner_or_admin(identity, &order)?;
        Ok(order)
    }

    /// Orders for a user. Non-admins may only list their own.
    pub async fn orders_for_user(
        &self,
        identity: &Identity,
        user_email: Option<&str>,
    ) -> Result<Vec<OrderSummary>, ServiceError> {
        let email = user_email.unwrap_or(&identity.email);
        if email != identity.email && !identity.has_role(Role::Admin) {
            return Err(ServiceError::Forbidden(
                "You are not authorized to view orders for another user.".to_string(),
            ));
        }
        self.store.list_by_user_email(email).await
    }

    pub async fn orders_for_restaurant(
        &self,
        identity: &Identity,
        restaurant_id: Uuid,
    ) -> Result<Vec<OrderSummary>, ServiceError> {
        identity.require_role(&[Role::RestaurantOwner, Role::Admin])?;
        self.store.list_by_restaurant(restaurant_id).await
    }

    pub async fn update_status(
        &self,
        identity: &Identity,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderSummary, ServiceError> {
        identity.require_role(&[Role::RestaurantOwner, Role::Admin])?;

        let mut order = self.load(order_id).await?;
        if !order.status.can_transition_to(new_status) {
            return Err(ServiceError::Conflict(format!(
                "Illegal status transition from {} to {}.",
                order.status, new_status
            )));
        }

        order.status = new_status;
        order.last_updated = Utc::now();
        self.store
            .set_status(order.id, order.status, order.last_updated)
            .await?;

        tracing::info!(%order_id, status = %new_status, "order status updated");
        Ok(OrderSummary::from(&order))
    }

    pub async fn cancel(&self, identity: &Identity, order_id: Uuid) -> Result<(), ServiceError> {
        let order = self.load(order_id).await?;
        ensure_owner_or_admin(identity, &order)?;

        if !order.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(ServiceError::Conflict(format!(
                "Cannot cancel an order in status {}.",
                order.status
            )));
        }

        self.store
            .set_status(order.id, OrderStatus::Cancelled, Utc::now())
            .await?;

        tracing::info!(%order_id, "order cancelled");
        Ok(())
    }

    async fn load(&self, order_id: Uuid) -> Result<Order, ServiceError> {
        self.store.find(order_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Order not found with id: {}", order_id))
        })
    }
}

fn ensure_owner_or_admin(identity: &Identity, order: &Order) -> Result<(), ServiceError> {
    if identity.has_role(Role::Admin) || order.user_email == identity.email {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "You are not authorized to access this order.".to_string(),
        ))
    }
}

fn validate_request(request: &OrderRequest) -> Result<(), ServiceError> {
    if request.order_items.is_empty() {
        return Err(ServiceError::Validation(
            "Order must contain at least one item".to_string(),
        ));
    }
    if request.delivery_address.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Delivery address is required".to_string(),
        ));
    }
    for item in &request.order_items {
        if item.quantity <= 0 {
            return Err(ServiceError::Validation(format!(
                "Quantity must be positive for menu item: {}",
                item.menu_item_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{
        DirectoryError, GuardedRestaurantDirectory, RestaurantSnapshot, FALLBACK_RESTAURANT_NAME,
    };
    use crate::utils::{CircuitBreaker, CircuitBreakerConfig};
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;

    // ------------------------------------------------------------------
    // Test doubles
    // ------------------------------------------------------------------

    #[derive(Default)]
    struct InMemoryOrderStore {
        orders: Mutex<HashMap<Uuid, Order>>,
        writes: AtomicU32,
    }

    #[async_trait]
    impl OrderStore for InMemoryOrderStore {
        async fn insert(&self, order: &Order) -> Result<(), ServiceError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.orders.lock().await.insert(order.id, order.clone());
            Ok(())
        }

        async fn find(&self, id: Uuid) -> Result<Option<Order>, ServiceError> {
            Ok(self.orders.lock().await.get(&id).cloned())
        }

        async fn list_by_user_email(
            &self,
            email: &str,
        ) -> Result<Vec<OrderSummary>, ServiceError> {
            Ok(self
                .orders
                .lock()
                .await
                .values()
                .filter(|o| o.user_email == email)
                .map(OrderSummary::from)
                .collect())
        }

        async fn list_by_restaurant(
            &self,
            restaurant_id: Uuid,
        ) -> Result<Vec<OrderSummary>, ServiceError> {
            Ok(self
                .orders
                .lock()
                .await
                .values()
                .filter(|o| o.restaurant_id == restaurant_id)
                .map(OrderSummary::from)
                .collect())
        }

        async fn set_status(
            &self,
            id: Uuid,
            status: OrderStatus,
            last_updated: DateTime<Utc>,
        ) -> Result<(), ServiceError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut orders = self.orders.lock().await;
            let order = orders
                .get_mut(&id)
                .ok_or_else(|| ServiceError::NotFound(format!("Order not found with id: {}", id)))?;
            order.status = status;
            order.last_updated = last_updated;
            Ok(())
        }
    }

    /// Directory with a fixed restaurant and menu.
    struct StaticDirectory {
        restaurant: RestaurantSnapshot,
        menu: HashMap<Uuid, MenuItemSnapshot>,
    }

    #[async_trait]
    impl RestaurantDirectory for StaticDirectory {
        async fn restaurant(&self, id: Uuid) -> Result<RestaurantSnapshot, DirectoryError> {
            if id == self.restaurant.id {
                Ok(self.restaurant.clone())
            } else {
                Err(DirectoryError::NotFound(format!(
                    "Restaurant not found with id: {}",
                    id
                )))
            }
        }

        async fn menu_item(
            &self,
            _restaurant_id: Uuid,
            menu_item_id: Uuid,
        ) -> Result<MenuItemSnapshot, DirectoryError> {
            self.menu.get(&menu_item_id).cloned().ok_or_else(|| {
                DirectoryError::NotFound(format!("Menu item not found with ID: {}", menu_item_id))
            })
        }
    }

    /// Directory that is always unreachable.
    struct DownDirectory;

    #[async_trait]
    impl RestaurantDirectory for DownDirectory {
        async fn restaurant(&self, _: Uuid) -> Result<RestaurantSnapshot, DirectoryError> {
            Err(DirectoryError::Unavailable("connection refused".into()))
        }

        async fn menu_item(&self, _: Uuid, _: Uuid) -> Result<MenuItemSnapshot, DirectoryError> {
            Err(DirectoryError::Unavailable("connection refused".into()))
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<OrderPlacedEvent>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish_order_placed(&self, event: &OrderPlacedEvent) -> anyhow::Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("broker unreachable");
            }
            self.events.lock().await.push(event.clone());
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------

    struct Fixture {
        service: OrderService,
        store: Arc<InMemoryOrderStore>,
        publisher: Arc<RecordingPublisher>,
        restaurant_id: Uuid,
        pasta_id: Uuid,
        salad_id: Uuid,
    }

    fn decimal(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn fixture_with_directory(directory: Arc<dyn RestaurantDirectory>) -> Fixture {
        let restaurant_id = Uuid::new_v4();
        let pasta_id = Uuid::new_v4();
        let salad_id = Uuid::new_v4();

        let store = Arc::new(InMemoryOrderStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let service = OrderService::new(
            store.clone(),
            directory,
            publisher.clone(),
            Arc::new(Metrics::new().unwrap()),
        );

        Fixture {
            service,
            store,
            publisher,
            restaurant_id,
            pasta_id,
            salad_id,
        }
    }

    fn fixture() -> Fixture {
        let restaurant_id = Uuid::new_v4();
        let pasta_id = Uuid::new_v4();
        let salad_id = Uuid::new_v4();

        let directory = Arc::new(StaticDirectory {
            restaurant: RestaurantSnapshot {
                id: restaurant_id,
                name: "Pasta Palace".to_string(),
                address: "1 Noodle Way".to_string(),
                phone: "+1 555 0100".to_string(),
            },
            menu: HashMap::from([
                (
                    pasta_id,
                    MenuItemSnapshot {
                        id: pasta_id,
                        name: "Carbonara".to_string(),
                        price: decimal("10.00"),
                    },
                ),
                (
                    salad_id,
                    MenuItemSnapshot {
                        id: salad_id,
                        name: "Caesar Salad".to_string(),
                        price: decimal("5.00"),
                    },
                ),
            ]),
        });

        let store = Arc::new(InMemoryOrderStore::default());
        let publisher = Arc::new(RecordingPublisher::default());
        let service = OrderService::new(
            store.clone(),
            directory,
            publisher.clone(),
            Arc::new(Metrics::new().unwrap()),
        );

        Fixture {
            service,
            store,
            publisher,
            restaurant_id,
            pasta_id,
            salad_id,
        }
    }

    fn customer(email: &str) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            roles: vec![Role::Customer],
        }
    }

    fn owner() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            roles: vec![Role::RestaurantOwner],
        }
    }

    fn request(fixture: &Fixture, items: Vec<(Uuid, i32)>) -> OrderRequest {
        OrderRequest {
            restaurant_id: fixture.restaurant_id,
            delivery_address: "1 Example Way".to_string(),
            order_items: items
                .into_iter()
                .map(|(menu_item_id, quantity)| OrderItemRequest {
                    menu_item_id,
                    quantity,
                })
                .collect(),
        }
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_order_computes_exact_total() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        // 2 x 10.00 + 1 x 5.00 = 25.00
        let order = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 2), (fx.salad_id, 1)]))
            .await
            .unwrap();

        assert_eq!(order.total_amount, decimal("25.00"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.restaurant_name, "Pasta Palace");
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.order_date, order.last_updated);
    }

    #[tokio::test]
    async fn test_decimal_arithmetic_has_no_float_error() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        // Directory with an awkward price: 12.50 x 3 = 37.50 exactly
        let item_id = Uuid::new_v4();
        let directory = Arc::new(StaticDirectory {
            restaurant: RestaurantSnapshot {
                id: fx.restaurant_id,
                name: "Pasta Palace".to_string(),
                address: "1 Noodle Way".to_string(),
                phone: "+1 555 0100".to_string(),
            },
            menu: HashMap::from([(
                item_id,
                MenuItemSnapshot {
                    id: item_id,
                    name: "Tasting Menu".to_string(),
                    price: decimal("12.50"),
                },
            )]),
        });
        let store = Arc::new(InMemoryOrderStore::default());
        let service = OrderService::new(
            store,
            directory,
            Arc::new(RecordingPublisher::default()),
            Arc::new(Metrics::new().unwrap()),
        );

        let order = service
            .create_order(
                &identity,
                &OrderRequest {
                    restaurant_id: fx.restaurant_id,
                    delivery_address: "1 Example Way".to_string(),
                    order_items: vec![OrderItemRequest {
                        menu_item_id: item_id,
                        quantity: 3,
                    }],
                },
            )
            .await
            .unwrap();

        assert_eq!(order.total_amount, decimal("37.50"));
    }

    #[tokio::test]
    async fn test_empty_item_list_is_validation_error_with_no_write() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let result = fx.service.create_order(&identity, &request(&fx, vec![])).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(fx.store.writes.load(Ordering::SeqCst), 0);
        assert!(fx.publisher.events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_quantity_is_validation_error() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let result = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 0)]))
            .await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(fx.store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_delivery_address_is_validation_error() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let mut req = request(&fx, vec![(fx.pasta_id, 1)]);
        req.delivery_address = "   ".to_string();

        let result = fx.service.create_order(&identity, &req).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_missing_menu_item_fails_whole_order_without_write() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let result = fx
            .service
            .create_order(
                &identity,
                &request(&fx, vec![(fx.pasta_id, 1), (Uuid::new_v4(), 2)]),
            )
            .await;

        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert_eq!(fx.store.writes.load(Ordering::SeqCst), 0);
        assert!(fx.publisher.events.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_restaurant_is_not_found() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let mut req = request(&fx, vec![(fx.pasta_id, 1)]);
        req.restaurant_id = Uuid::new_v4();

        let result = fx.service.create_order(&identity, &req).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_order_captures_menu_item_name_and_price() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let order = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 2)]))
            .await
            .unwrap();

        let item = &order.items[0];
        assert_eq!(item.menu_item_name, "Carbonara");
        assert_eq!(item.price, decimal("10.00"));
        assert_eq!(item.quantity, 2);
    }

    #[tokio::test]
    async fn test_duplicate_item_ids_fetch_once_but_both_lines_kept() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let order = fx
            .service
            .create_order(
                &identity,
                &request(&fx, vec![(fx.pasta_id, 1), (fx.pasta_id, 2)]),
            )
            .await
            .unwrap();

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, decimal("30.00"));
    }

    #[tokio::test]
    async fn test_event_published_with_order_contents() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let order = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 2), (fx.salad_id, 1)]))
            .await
            .unwrap();

        let events = fx.publisher.events.lock().await;
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.order_id, order.id);
        assert_eq!(event.user_email, "ada@example.com");
        assert_eq!(event.total_amount, decimal("25.00"));
        assert_eq!(event.items.len(), 2);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_creation() {
        let fx = fixture();
        fx.publisher.fail.store(true, Ordering::SeqCst);
        let identity = customer("ada@example.com");

        let order = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 1)]))
            .await
            .unwrap();

        // The order is durable even though the event never went out
        assert!(fx.store.find(order.id).await.unwrap().is_some());
    }

    // ------------------------------------------------------------------
    // Breaker fallback
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_open_breaker_creates_order_with_fallback_data() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            cooldown: Duration::from_secs(60),
            success_threshold: 1,
        });
        // Trip the breaker before the order comes in
        let _ = breaker
            .call(async { Err::<(), _>("connection refused".to_string()) })
            .await;

        let guarded = GuardedRestaurantDirectory::with_breaker(DownDirectory, breaker);
        let fx = fixture_with_directory(Arc::new(guarded));
        let identity = customer("ada@example.com");

        let order = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 2)]))
            .await
            .unwrap();

        assert!(order.restaurant_name.contains(FALLBACK_RESTAURANT_NAME));
        assert_eq!(order.total_amount, Decimal::ZERO);
        assert!(fx.store.find(order.id).await.unwrap().is_some());
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_get_order_is_idempotent() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let created = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 2)]))
            .await
            .unwrap();

        let first = fx.service.get_order(&identity, created.id).await.unwrap();
        let second = fx.service.get_order(&identity, created.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_get_order_enforces_ownership() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let created = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 1)]))
            .await
            .unwrap();

        let stranger = customer("mallory@example.com");
        let result = fx.service.get_order(&stranger, created.id).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_list_orders_for_other_user_requires_admin() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let result = fx
            .service
            .orders_for_user(&identity, Some("someone-else@example.com"))
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let own = fx.service.orders_for_user(&identity, None).await.unwrap();
        assert!(own.is_empty());
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_status_follows_transition_table() {
        let fx = fixture();
        let identity = customer("ada@example.com");
        let staff = owner();

        let order = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 1)]))
            .await
            .unwrap();

        let updated = fx
            .service
            .update_status(&staff, order.id, OrderStatus::Preparing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);

        // Skipping straight to DELIVERED is illegal from PREPARING
        let skipped = fx
            .service
            .update_status(&staff, order.id, OrderStatus::Delivered)
            .await;
        assert!(matches!(skipped, Err(ServiceError::Conflict(_))));

        fx.service
            .update_status(&staff, order.id, OrderStatus::OutForDelivery)
            .await
            .unwrap();
        fx.service
            .update_status(&staff, order.id, OrderStatus::Delivered)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_status_requires_staff_role() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let order = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 1)]))
            .await
            .unwrap();

        let result = fx
            .service
            .update_status(&identity, order.id, OrderStatus::Preparing)
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cancel_twice_is_conflict() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let order = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 1)]))
            .await
            .unwrap();

        fx.service.cancel(&identity, order.id).await.unwrap();

        let second = fx.service.cancel(&identity, order.id).await;
        assert!(matches!(second, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cancel_delivered_order_is_conflict() {
        let fx = fixture();
        let identity = customer("ada@example.com");
        let staff = owner();

        let order = fx
            .service
            .create_order(&identity, &request(&fx, vec![(fx.pasta_id, 1)]))
            .await
            .unwrap();

        for status in [
            OrderStatus::Preparing,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            fx.service.update_status(&staff, order.id, status).await.unwrap();
        }

        let result = fx.service.cancel(&identity, order.id).await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cancel_unknown_order_is_not_found() {
        let fx = fixture();
        let identity = customer("ada@example.com");

        let result = fx.service.cancel(&identity, Uuid::new_v4()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
