use std::sync::Arc;

use chrono::Duration;

use super::principal::{Principal, PrincipalStore};
use super::{generate_jwt, validate_jwt, AuthError, Claims};

/// Resolves callers from bearer tokens and checks their permissions
#[derive(Clone)]
pub struct AuthGuard {
    secret: String,
    principals: Arc<dyn PrincipalStore>,
}

impl AuthGuard {
    pub fn new(secret: impl Into<String>, principals: Arc<dyn PrincipalStore>) -> Self {
        Self {
            secret: secret.into(),
            principals,
        }
    }

    /// No credential yields the anonymous principal; a credential that does
    /// not verify, or names an unknown user, is `InvalidCredential`.
    pub async fn authenticate(&self, credential: Option<&str>) -> Result<Principal, AuthError> {
        let Some(token) = credential else {
            return Ok(Principal::anonymous());
        };

        let claims = validate_jwt(token, &self.secret)?;
        match self.principals.find_principal(claims.sub).await? {
            Some(principal) => Ok(principal),
            None => {
                tracing::warn!("Token for unknown user {} rejected", claims.sub);
                Err(AuthError::InvalidCredential)
            }
        }
    }

    /// Checks, in order: authenticated, activated, holds `permission`.
    pub fn authorize(principal: &Principal, permission: &str) -> Result<(), AuthError> {
        if principal.is_anonymous() {
            return Err(AuthError::AuthenticationRequired);
        }
        if !principal.activated {
            return Err(AuthError::InactiveAccount);
        }
        if !principal.has_permission(permission) {
            return Err(AuthError::Forbidden);
        }
        Ok(())
    }

    pub fn issue_token(&self, user_id: i64, ttl: Duration) -> Result<String, AuthError> {
        generate_jwt(&Claims::new(user_id, ttl), &self.secret)
    }
}

/// Extracts the token from an `Authorization` header value.
///
/// A missing or blank header is no credential; anything other than
/// `Bearer <token>` is an invalid one.
pub fn bearer_token(header: Option<&str>) -> Result<Option<&str>, AuthError> {
    let Some(value) = header.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match value.split_once(' ') {
        Some((scheme, token)) if scheme == "Bearer" && !token.trim().is_empty() => Ok(Some(token.trim())),
        _ => Err(AuthError::InvalidCredential),
    }
}
