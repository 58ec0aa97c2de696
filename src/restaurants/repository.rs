use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::restaurants::model::{MenuItem, Restaurant};

// ============================================================================
// Restaurant Store
// ============================================================================

#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn insert_restaurant(&self, restaurant: &Restaurant) -> Result<(), ServiceError>;
    async fn find_restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError>;
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, ServiceError>;
    async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<Restaurant>, ServiceError>;
    async fn update_restaurant(&self, restaurant: &Restaurant) -> Result<(), ServiceError>;
    async fn delete_restaurant(&self, id: Uuid) -> Result<(), ServiceError>;

    async fn insert_menu_item(&self, item: &MenuItem) -> Result<(), ServiceError>;
    async fn find_menu_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<MenuItem>, ServiceError>;
    async fn list_menu_items(&self, restaurant_id: Uuid) -> Result<Vec<MenuItem>, ServiceError>;
    async fn update_menu_item(&self, item: &MenuItem) -> Result<(), ServiceError>;
    async fn delete_menu_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), ServiceError>;
}

pub struct PgRestaurantStore {
    pool: PgPool,
}

impl PgRestaurantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), ServiceError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS restaurants (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                address TEXT NOT NULL,
                phone TEXT NOT NULL,
                owner_email TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS menu_items (
                id UUID PRIMARY KEY,
                restaurant_id UUID NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                price NUMERIC(10,2) NOT NULL,
                available BOOLEAN NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RestaurantStore for PgRestaurantStore {
    async fn insert_restaurant(&self, restaurant: &Restaurant) -> Result<(), ServiceError> {
        let result = sqlx::query(
            "INSERT INTO restaurants (id, name, address, phone, owner_email)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(restaurant.id)
        .bind(&restaurant.name)
        .bind(&restaurant.address)
        .bind(&restaurant.phone)
        .bind(&restaurant.owner_email)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => Err(
                ServiceError::Conflict("A restaurant with this name already exists.".to_string()),
            ),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_restaurant(&self, id: Uuid) -> Result<Option<Restaurant>, ServiceError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            "SELECT id, name, address, phone, owner_email FROM restaurants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(restaurant)
    }

    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, ServiceError> {
        let restaurants = sqlx::query_as::<_, Restaurant>(
            "SELECT id, name, address, phone, owner_email FROM restaurants ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(restaurants)
    }

    async fn list_by_owner(&self, owner_email: &str) -> Result<Vec<Restaurant>, ServiceError> {
        let restaurants = sqlx::query_as::<_, Restaurant>(
            "SELECT id, name, address, phone, owner_email FROM restaurants
             WHERE owner_email = $1 ORDER BY name",
        )
        .bind(owner_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(restaurants)
    }

    async fn update_restaurant(&self, restaurant: &Restaurant) -> Result<(), ServiceError> {
        sqlx::query("UPDATE restaurants SET name = $1, address = $2, phone = $3 WHERE id = $4")
            .bind(&restaurant.name)
            .bind(&restaurant.address)
            .bind(&restaurant.phone)
            .bind(restaurant.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_restaurant(&self, id: Uuid) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM restaurants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_menu_item(&self, item: &MenuItem) -> Result<(), ServiceError> {
        sqlx::query(
            "INSERT INTO menu_items (id, restaurant_id, name, description, price, available)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(item.id)
        .bind(item.restaurant_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.available)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_menu_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<MenuItem>, ServiceError> {
        let item = sqlx::query_as::<_, MenuItem>(
            "SELECT id, restaurant_id, name, description, price, available
             FROM menu_items WHERE restaurant_id = $1 AND id = $2",
        )
        .bind(restaurant_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn list_menu_items(&self, restaurant_id: Uuid) -> Result<Vec<MenuItem>, ServiceError> {
        let items = sqlx::query_as::<_, MenuItem>(
            "SELECT id, restaurant_id, name, description, price, available
             FROM menu_items WHERE restaurant_id = $1 ORDER BY name",
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn update_menu_item(&self, item: &MenuItem) -> Result<(), ServiceError> {
        sqlx::query(
            "UPDATE menu_items SET name = $1, description = $2, price = $3, available = $4
             WHERE id = $5 AND restaurant_id = $6",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.available)
        .bind(item.id)
        .bind(item.restaurant_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_menu_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM menu_items WHERE restaurant_id = $1 AND id = $2")
            .bind(restaurant_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
