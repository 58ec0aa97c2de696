// ============================================================================
// Authentication Component
// ============================================================================
//
// Credential verification, signed bearer tokens, and the request-scoped
// identity every protected endpoint extracts at its boundary.
//
// ============================================================================

pub mod handlers;
pub mod identity;
pub mod jwt;
pub mod model;
pub mod repository;
pub mod service;

pub use identity::Identity;
pub use jwt::{Claims, TokenIssuer, TokenVerifier};
pub use model::{Role, User};
pub use repository::{PgUserStore, UserStore};
pub use service::{AuthResponse, AuthService, LoginRequest, RegisterRequest};
