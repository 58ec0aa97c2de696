use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt::TokenIssuer;
use crate::auth::model::{Role, User};
use crate::auth::repository::UserStore;
use crate::error::ServiceError;

// ============================================================================
// Auth Service
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub role: Option<Role>,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, issuer: TokenIssuer) -> Self {
        Self { users, issuer }
    }

    /// Register a customer account.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ServiceError> {
        self.register_with_role(request, Role::Customer).await
    }

    /// Register a restaurant owner account.
    pub async fn register_owner(&self, request: &RegisterRequest) -> Result<User, ServiceError> {
        self.register_with_role(request, Role::RestaurantOwner).await
    }

    async fn register_with_role(
        &self,
        request: &RegisterRequest,
        role: Role,
    ) -> Result<User, ServiceError> {
        validate_credentials(&request.email, &request.password)?;

        if self.users.email_exists(&request.email).await? {
            return Err(ServiceError::Conflict(
                "User with this email already exists.".to_string(),
            ));
        }

        let password = request.password.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| ServiceError::Internal(e.into()))?
                .map_err(|e| ServiceError::Internal(e.into()))?;

        let user = User {
            id: Uuid::new_v4(),
            email: request.email.clone(),
            password_hash,
            roles: vec![role],
            created_at: Utc::now(),
        };

        self.users.insert(&user).await?;

        tracing::info!(user_id = %user.id, role = %role, "user registered");
        Ok(user)
    }

    /// Verify credentials and issue a bearer token.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ServiceError> {
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        let password = request.password.clone();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| ServiceError::Internal(e.into()))?
            .map_err(|e| ServiceError::Internal(e.into()))?;

        if !matches {
            return Err(invalid_credentials());
        }

        let (access_token, expires_in) = self.issuer.issue(user.id, &user.email, &user.roles)?;

        tracing::info!(user_id = %user.id, "login successful");
        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            role: user.roles.first().copied(),
        })
    }
}

fn invalid_credentials() -> ServiceError {
    // One message for both unknown email and bad password
    ServiceError::Unauthorized("Invalid email or password.".to_string())
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ServiceError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ServiceError::Validation(
            "A valid email address is required.".to_string(),
        ));
    }
    if password.len() < 6 {
        return Err(ServiceError::Validation(
            "Password must be at least 6 characters.".to_string(),
        ));
    }
    Ok(())
}
