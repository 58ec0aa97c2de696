use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::ApiResponse;
use crate::error::ServiceError;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};

/// Marker name written into orders created while the directory was down.
/// Such orders carry explicitly-flagged fallback data and are reconciled
/// later by their denormalized name.
pub const FALLBACK_RESTAURANT_NAME: &str = "Fallback Restaurant Name (Service Unavailable)";

const FALLBACK_ADDRESS: &str = "Fallback Address (Service Issue)";
const FALLBACK_PHONE: &str = "Fallback Contact (Service Issue)";
const FALLBACK_MENU_ITEM_NAME: &str = "Unavailable Item";

/// Per-call timeout for directory lookups.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

// ============================================================================
// Snapshots
// ============================================================================
//
// Transient views of directory data, captured at order-creation time. Only
// the restaurant name is denormalized into the order.
//
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSnapshot {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The directory answered and the entity does not exist. Never counted
    /// against the circuit breaker and never replaced by fallback data.
    #[error("{0}")]
    NotFound(String),

    /// Transport failure, timeout, or a 5xx answer.
    #[error("restaurant service unavailable: {0}")]
    Unavailable(String),
}

impl From<DirectoryError> for ServiceError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(msg) => ServiceError::NotFound(msg),
            DirectoryError::Unavailable(msg) => ServiceError::Upstream(msg),
        }
    }
}

#[async_trait]
pub trait RestaurantDirectory: Send + Sync {
    async fn restaurant(&self, restaurant_id: Uuid) -> Result<RestaurantSnapshot, DirectoryError>;

    async fn menu_item(
        &self,
        restaurant_id: Uuid,
        menu_item_id: Uuid,
    ) -> Result<MenuItemSnapshot, DirectoryError>;
}

// ============================================================================
// HTTP Implementation
// ============================================================================

pub struct HttpRestaurantDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRestaurantDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create restaurant directory HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        not_found_message: String,
    ) -> Result<T, DirectoryError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(not_found_message));
        }
        if status.is_client_error() {
            // The directory rejected the request itself; treat like a miss
            // rather than a directory outage.
            return Err(DirectoryError::NotFound(not_found_message));
        }
        if !status.is_success() {
            return Err(DirectoryError::Unavailable(format!(
                "restaurant service returned {}",
                status
            )));
        }

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

        envelope
            .data
            .ok_or_else(|| DirectoryError::Unavailable("response envelope carried no data".into()))
    }
}

#[async_trait]
impl RestaurantDirectory for HttpRestaurantDirectory {
    async fn restaurant(&self, restaurant_id: Uuid) -> Result<RestaurantSnapshot, DirectoryError> {
        tracing::debug!(%restaurant_id, "fetching restaurant details");
        self.get_envelope(
            &format!("/api/restaurants/{}", restaurant_id),
            format!("Restaurant not found with id: {}", restaurant_id),
        )
        .await
    }

    async fn menu_item(
        &self,
        restaurant_id: Uuid,
        menu_item_id: Uuid,
    ) -> Result<MenuItemSnapshot, DirectoryError> {
        tracing::debug!(%restaurant_id, %menu_item_id, "fetching menu item");
        self.get_envelope(
            &format!(
                "/api/restaurants/{}/menu-items/{}",
                restaurant_id, menu_item_id
            ),
            format!("Menu item not found with ID: {}", menu_item_id),
        )
        .await
    }
}

// ============================================================================
// Circuit-Breaker-Guarded Decorator
// ============================================================================
//
// Routes every directory call through the breaker. Unavailability (network
// errors, timeouts, 5xx) counts as a breaker failure and is answered with
// fallback data so order creation does not hard-fail on a directory outage.
// A genuine "not found" passes through untouched: it is a domain miss, not a
// directory failure.
//
// ============================================================================

pub struct GuardedRestaurantDirectory<D> {
    inner: D,
    breaker: CircuitBreaker,
}

impl<D: RestaurantDirectory> GuardedRestaurantDirectory<D> {
    pub fn new(inner: D) -> Self {
        Self::with_breaker(inner, CircuitBreaker::new(CircuitBreakerConfig::default()))
    }

    pub fn with_breaker(inner: D, breaker: CircuitBreaker) -> Self {
        Self { inner, breaker }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    fn fallback_restaurant(restaurant_id: Uuid) -> RestaurantSnapshot {
        RestaurantSnapshot {
            id: restaurant_id,
            name: FALLBACK_RESTAURANT_NAME.to_string(),
            address: FALLBACK_ADDRESS.to_string(),
            phone: FALLBACK_PHONE.to_string(),
        }
    }

    fn fallback_menu_item(menu_item_id: Uuid) -> MenuItemSnapshot {
        MenuItemSnapshot {
            id: menu_item_id,
            name: FALLBACK_MENU_ITEM_NAME.to_string(),
            price: Decimal::ZERO,
        }
    }

    /// Run one directory call through the breaker. The inner result is
    /// re-partitioned so that only `Unavailable` feeds breaker accounting.
    async fn guarded<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, DirectoryError>>,
    ) -> Result<Result<T, DirectoryError>, CircuitBreakerError<String>> {
        self.breaker
            .call(async {
                match call.await {
                    Err(DirectoryError::Unavailable(reason)) => Err(reason),
                    other => Ok(other),
                }
            })
            .await
    }
}

#[async_trait]
impl<D: RestaurantDirectory> RestaurantDirectory for GuardedRestaurantDirectory<D> {
    async fn restaurant(&self, restaurant_id: Uuid) -> Result<RestaurantSnapshot, DirectoryError> {
        match self.guarded(self.inner.restaurant(restaurant_id)).await {
            Ok(result) => result,
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::warn!(%restaurant_id, "circuit open, serving fallback restaurant data");
                Ok(Self::fallback_restaurant(restaurant_id))
            }
            Err(CircuitBreakerError::OperationFailed(reason)) => {
                tracing::warn!(%restaurant_id, %reason, "directory unavailable, serving fallback restaurant data");
                Ok(Self::fallback_restaurant(restaurant_id))
            }
        }
    }

    async fn menu_item(
        &self,
        restaurant_id: Uuid,
        menu_item_id: Uuid,
    ) -> Result<MenuItemSnapshot, DirectoryError> {
        match self
            .guarded(self.inner.menu_item(restaurant_id, menu_item_id))
            .await
        {
            Ok(result) => result,
            Err(CircuitBreakerError::CircuitOpen) => {
                tracing::warn!(%menu_item_id, "circuit open, serving fallback menu item");
                Ok(Self::fallback_menu_item(menu_item_id))
            }
            Err(CircuitBreakerError::OperationFailed(reason)) => {
                tracing::warn!(%menu_item_id, %reason, "directory unavailable, serving fallback menu item");
                Ok(Self::fallback_menu_item(menu_item_id))
            }
        }
    }
}
