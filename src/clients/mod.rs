// ============================================================================
// Outbound Clients
// ============================================================================
//
// Remote-service clients used by the order workflow. The restaurant
// directory client comes in two layers: a plain HTTP implementation and a
// circuit-breaker-guarded decorator that substitutes fallback data while the
// directory is unhealthy.
//
// ============================================================================

pub mod restaurant;

pub use restaurant::{
    DirectoryError, GuardedRestaurantDirectory, HttpRestaurantDirectory, MenuItemSnapshot,
    RestaurantDirectory, RestaurantSnapshot, FALLBACK_RESTAURANT_NAME,
};
