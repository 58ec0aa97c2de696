// ============================================================================
// Restaurant Directory
// ============================================================================
//
// Restaurants and their menu items, with owner-scoped mutation rights. The
// read endpoints double as the upstream the order workflow resolves
// restaurant and menu-item snapshots from.
//
// ============================================================================

pub mod handlers;
pub mod model;
pub mod repository;
pub mod service;

pub use model::{MenuItem, Restaurant};
pub use repository::{PgRestaurantStore, RestaurantStore};
pub use service::{MenuItemRequest, RestaurantRequest, RestaurantService};
