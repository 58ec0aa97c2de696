use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::jwt::{Claims, TokenVerifier};
use crate::auth::model::{parse_roles, Role};
use crate::error::ServiceError;

// ============================================================================
// Request-Scoped Identity
// ============================================================================
//
// Identity is established exactly once, at the service boundary, and passed
// down the call chain as a plain value. Two sources are accepted:
//
// 1. `Authorization: Bearer <token>` verified against the shared secret.
// 2. The `X-Auth-*` headers forwarded by the verifying edge gateway.
//
// Absence of both means the request is unauthenticated.
//
// ============================================================================

pub const USER_ID_HEADER: &str = "X-Auth-User-Id";
pub const USER_EMAIL_HEADER: &str = "X-Auth-User-Email";
pub const USER_ROLES_HEADER: &str = "X-Auth-User-Roles";

#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
}

impl Identity {
    pub fn from_claims(claims: &Claims) -> Result<Self, ServiceError> {
        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| ServiceError::Unauthorized("Malformed subject claim.".to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email.clone(),
            roles: parse_roles(&claims.roles),
        })
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Require at least one of the given roles.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ServiceError> {
        if allowed.iter().any(|role| self.has_role(*role)) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "You do not have permission to perform this action.".to_string(),
            ))
        }
    }
}

impl FromRequest for Identity {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_identity(req))
    }
}

fn extract_identity(req: &HttpRequest) -> Result<Identity, ServiceError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ServiceError::Unauthorized("Malformed Authorization header.".to_string())
            })?;

        let verifier = req
            .app_data::<web::Data<TokenVerifier>>()
            .ok_or_else(|| {
                ServiceError::Internal(anyhow::anyhow!("token verifier not configured"))
            })?;

        let claims = verifier.verify(token)?;
        return Identity::from_claims(&claims);
    }

    // Gateway-forwarded identity: the edge verified the token and handed us
    // the claims as headers.
    let user_id = required_header(req, USER_ID_HEADER)?
        .parse::<Uuid>()
        .map_err(|_| ServiceError::Unauthorized("Malformed identity headers.".to_string()))?;
    let email = required_header(req, USER_EMAIL_HEADER)?;
    let roles = parse_roles(&required_header(req, USER_ROLES_HEADER)?);

    Ok(Identity {
        user_id,
        email,
        roles,
    })
}

fn required_header(req: &HttpRequest, name: &str) -> Result<String, ServiceError> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Unauthorized("User is not authenticated.".to_string()))
}
