use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Auth Domain Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_CUSTOMER")]
    Customer,
    #[serde(rename = "ROLE_RESTAURANT_OWNER")]
    RestaurantOwner,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "ROLE_CUSTOMER",
            Role::RestaurantOwner => "ROLE_RESTAURANT_OWNER",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value.trim() {
            "ROLE_CUSTOMER" => Some(Role::Customer),
            "ROLE_RESTAURANT_OWNER" => Some(Role::RestaurantOwner),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join roles into the comma-separated claim form carried in tokens and
/// forwarded headers.
pub fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse the comma-separated claim form back into roles, dropping anything
/// unrecognized.
pub fn parse_roles(value: &str) -> Vec<Role> {
    value.split(',').filter_map(Role::parse).collect()
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}
