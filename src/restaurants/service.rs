use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{Identity, Role};
use crate::error::ServiceError;
use crate::restaurants::model::{MenuItem, Restaurant};
use crate::restaurants::repository::RestaurantStore;

// ============================================================================
// Restaurant Service
// ============================================================================
//
// Owner email is taken from the authenticated identity, never from the
// request body. Mutations require the caller to own the restaurant (admins
// bypass the ownership check).
//
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RestaurantRequest {
    pub name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub available: bool,
}

pub struct RestaurantService {
    store: Arc<dyn RestaurantStore>,
}

impl RestaurantService {
    pub fn new(store: Arc<dyn RestaurantStore>) -> Self {
        Self { store }
    }

    pub async fn create_restaurant(
        &self,
        identity: &Identity,
        request: &RestaurantRequest,
    ) -> Result<Restaurant, ServiceError> {
        identity.require_role(&[Role::RestaurantOwner, Role::Admin])?;
        validate_restaurant(request)?;

        let restaurant = Restaurant {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            address: request.address.clone(),
            phone: request.phone.clone(),
            owner_email: identity.email.clone(),
        };
        self.store.insert_restaurant(&restaurant).await?;

        tracing::info!(restaurant_id = %restaurant.id, owner = %restaurant.owner_email, "restaurant created");
        Ok(restaurant)
    }

    pub async fn list_restaurants(&self) -> Result<Vec<Restaurant>, ServiceError> {
        self.store.list_restaurants().await
    }

    pub async fn get_restaurant(&self, id: Uuid) -> Result<Restaurant, ServiceError> {
        self.load_restaurant(id).await
    }

    pub async fn my_restaurants(
        &self,
        identity: &Identity,
    ) -> Result<Vec<Restaurant>, ServiceError> {
        identity.require_role(&[Role::RestaurantOwner, Role::Admin])?;
        self.store.list_by_owner(&identity.email).await
    }

    pub async fn update_restaurant(
        &self,
        identity: &Identity,
        id: Uuid,
        request: &RestaurantRequest,
    ) -> Result<Restaurant, ServiceError> {
        validate_restaurant(request)?;

        let mut restaurant = self.load_restaurant(id).await?;
        check_ownership(identity, &restaurant)?;

        restaurant.name = request.name.clone();
        restaurant.address = request.address.clone();
        restaurant.phone = request.phone.clone();
        self.store.update_restaurant(&restaurant).await?;

        Ok(restaurant)
    }

    pub async fn delete_restaurant(
        &self,
        identity: &Identity,
        id: Uuid,
    ) -> Result<(), ServiceError> {
        let restaurant = self.load_restaurant(id).await?;
        check_ownership(identity, &restaurant)?;

        self.store.delete_restaurant(id).await?;
        tracing::info!(restaurant_id = %id, "restaurant deleted");
        Ok(())
    }

    pub async fn create_menu_item(
        &self,
        identity: &Identity,
        restaurant_id: Uuid,
        request: &MenuItemRequest,
    ) -> Result<MenuItem, ServiceError> {
        validate_menu_item(request)?;

        let restaurant = self.load_restaurant(restaurant_id).await?;
        check_ownership(identity, &restaurant)?;

        let item = MenuItem {
            id: Uuid::new_v4(),
            restaurant_id,
            name: request.name.clone(),
            description: request.description.clone(),
            price: request.price,
            available: request.available,
        };
        self.store.insert_menu_item(&item).await?;

        Ok(item)
    }

    pub async fn list_menu_items(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Vec<MenuItem>, ServiceError> {
        // Listing for a restaurant that does not exist is a 404, not empty
        self.load_restaurant(restaurant_id).await?;
        self.store.list_menu_items(restaurant_id).await
    }

    pub async fn get_menu_item(
        &self,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<MenuItem, ServiceError> {
        self.store
            .find_menu_item(restaurant_id, item_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Menu item not found with ID: {}", item_id))
            })
    }

    pub async fn update_menu_item(
        &self,
        identity: &Identity,
        restaurant_id: Uuid,
        item_id: Uuid,
        request: &MenuItemRequest,
    ) -> Result<MenuItem, ServiceError> {
        validate_menu_item(request)?;

        let restaurant = self.load_restaurant(restaurant_id).await?;
        check_ownership(identity, &restaurant)?;

        let mut item = self.get_menu_item(restaurant_id, item_id).await?;
        item.name = request.name.clone();
        item.description = request.description.clone();
        item.price = request.price;
        item.available = request.available;
        self.store.update_menu_item(&item).await?;

        Ok(item)
    }

    pub async fn delete_menu_item(
        &self,
        identity: &Identity,
        restaurant_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), ServiceError> {
        let restaurant = self.load_restaurant(restaurant_id).await?;
        check_ownership(identity, &restaurant)?;

        // Make sure the item actually belongs to this restaurant
        self.get_menu_item(restaurant_id, item_id).await?;
        self.store.delete_menu_item(restaurant_id, item_id).await?;
        Ok(())
    }

    async fn load_restaurant(&self, id: Uuid) -> Result<Restaurant, ServiceError> {
        self.store.find_restaurant(id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Restaurant not found with id: {}", id))
        })
    }
}

fn check_ownership(identity: &Identity, restaurant: &Restaurant) -> Result<(), ServiceError> {
    if identity.has_role(Role::Admin) || restaurant.owner_email == identity.email {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "You are not authorized to manage this restaurant.".to_string(),
        ))
    }
}

fn validate_restaurant(request: &RestaurantRequest) -> Result<(), ServiceError> {
    if request.name.trim().is_empty() {
        return Err(ServiceError::Validation("Name is required".to_string()));
    }
    if request.address.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Address cannot be blank".to_string(),
        ));
    }
    if request.phone.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Phone number is required".to_string(),
        ));
    }
    Ok(())
}

fn validate_menu_item(request: &MenuItemRequest) -> Result<(), ServiceError> {
    if request.name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Item name is required".to_string(),
        ));
    }
    if request.price <= Decimal::ZERO {
        return Err(ServiceError::Validation(
            "Price must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
