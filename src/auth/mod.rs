pub mod guard;
pub mod principal;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use guard::AuthGuard;
pub use principal::{Identity, MemoryPrincipalStore, Principal, PrincipalStore};

pub const PERMISSION_PUZZLES_READ: &str = "puzzles:read";
pub const PERMISSION_PUZZLES_WRITE: &str = "puzzles:write";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or missing authentication token")]
    InvalidCredential,

    #[error("you must be authenticated to access this resource")]
    AuthenticationRequired,

    #[error("your user account must be activated to access this resource")]
    InactiveAccount,

    #[error("your user account doesn't have the necessary permissions to access this resource")]
    Forbidden,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("principal lookup failed: {0}")]
    Store(#[from] crate::database::StoreError),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Validate JWT signature and expiry, returning its claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            AuthError::InvalidCredential
        })
}
