use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::orders::model::{Order, OrderItem, OrderStatus, OrderSummary};

// ============================================================================
// Order Store
// ============================================================================
//
// The aggregate commits as one unit: order row plus item rows in a single
// transaction. Orders are never deleted; cancellation is a status change.
//
// ============================================================================

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), ServiceError>;
    async fn find(&self, id: Uuid) -> Result<Option<Order>, ServiceError>;
    async fn list_by_user_email(&self, email: &str) -> Result<Vec<OrderSummary>, ServiceError>;
    async fn list_by_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Vec<OrderSummary>, ServiceError>;
    async fn set_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        last_updated: DateTime<Utc>,
    ) -> Result<(), ServiceError>;
}

pub struct PgOrderStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    user_email: String,
    restaurant_id: Uuid,
    restaurant_name: String,
    total_amount: Decimal,
    status: String,
    delivery_address: String,
    order_date: DateTime<Utc>,
    last_updated: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    menu_item_id: Uuid,
    menu_item_name: String,
    quantity: i32,
    price: Decimal,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, ServiceError> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            user_email: self.user_email,
            restaurant_id: self.restaurant_id,
            restaurant_name: self.restaurant_name,
            items,
            total_amount: self.total_amount,
            status,
            delivery_address: self.delivery_address,
            order_date: self.order_date,
            last_updated: self.last_updated,
        })
    }

    fn into_summary(self) -> Result<OrderSummary, ServiceError> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!(e)))?;

        Ok(OrderSummary {
            id: self.id,
            user_email: self.user_email,
            restaurant_name: self.restaurant_name,
            total_amount: self.total_amount,
            status,
            delivery_address: self.delivery_address,
            order_date: self.order_date,
        })
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            menu_item_id: row.menu_item_id,
            menu_item_name: row.menu_item_name,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

const SELECT_ORDER: &str = "SELECT id, user_id, user_email, restaurant_id, restaurant_name, \
     total_amount, status, delivery_address, order_date, last_updated FROM orders";

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), ServiceError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS orders (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL,
                user_email TEXT NOT NULL,
                restaurant_id UUID NOT NULL,
                restaurant_name TEXT NOT NULL,
                total_amount NUMERIC(10,2) NOT NULL,
                status TEXT NOT NULL,
                delivery_address TEXT NOT NULL,
                order_date TIMESTAMPTZ NOT NULL,
                last_updated TIMESTAMPTZ NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS order_items (
                id UUID PRIMARY KEY,
                order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                menu_item_id UUID NOT NULL,
                menu_item_name TEXT NOT NULL,
                quantity INT NOT NULL,
                price NUMERIC(10,2) NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn items_for(&self, order_id: Uuid) -> Result<Vec<OrderItem>, ServiceError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, menu_item_id, menu_item_name, quantity, price
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, user_id, user_email, restaurant_id, restaurant_name,
                                 total_amount, status, delivery_address, order_date, last_updated)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(&order.user_email)
        .bind(order.restaurant_id)
        .bind(&order.restaurant_name)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(&order.delivery_address)
        .bind(order.order_date)
        .bind(order.last_updated)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, menu_item_id, menu_item_name, quantity, price)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(item.id)
            .bind(order.id)
            .bind(item.menu_item_id)
            .bind(&item.menu_item_name)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(order_id = %order.id, items = order.items.len(), "order aggregate persisted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>, ServiceError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{} WHERE id = $1", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let items = self.items_for(id).await?;
                Ok(Some(row.into_order(items)?))
            }
        }
    }

    async fn list_by_user_email(&self, email: &str) -> Result<Vec<OrderSummary>, ServiceError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} WHERE user_email = $1 ORDER BY order_date DESC",
            SELECT_ORDER
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_summary).collect()
    }

    async fn list_by_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Vec<OrderSummary>, ServiceError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} WHERE restaurant_id = $1 ORDER BY order_date DESC",
            SELECT_ORDER
        ))
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_summary).collect()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        last_updated: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let result = sqlx::query("UPDATE orders SET status = $1, last_updated = $2 WHERE id = $3")
            .bind(status.as_str())
            .bind(last_updated)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!(
                "Order not found with id: {}",
                id
            )));
        }
        Ok(())
    }
}
