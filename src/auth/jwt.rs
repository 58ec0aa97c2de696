use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::model::{join_roles, Role};
use crate::error::ServiceError;

// ============================================================================
// Signed Session Tokens
// ============================================================================
//
// HS256 tokens carrying the caller's identity and role claims. The issuer
// lives in the auth service; every service holds a verifier for the shared
// secret so identity is checked at each boundary rather than trusted blindly.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    pub email: String,
    /// Comma-separated role names.
    pub roles: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issue a token for the given identity. Returns the token and its
    /// lifetime in seconds.
    pub fn issue(
        &self,
        user_id: Uuid,
        email: &str,
        roles: &[Role],
    ) -> Result<(String, u64), ServiceError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            roles: join_roles(roles),
            iat: now,
            exp: now + self.ttl_secs as i64,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(e.into()))?;

        Ok((token, self.ttl_secs))
    }
}

#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                ServiceError::Unauthorized("Invalid or expired token.".to_string())
            })
    }
}
