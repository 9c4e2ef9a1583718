use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::auth::{Principal, PrincipalStore};
use crate::database::store::{with_timeout, StoreResult};

/// Reads users and their permission codes for the auth guard
#[derive(Clone)]
pub struct PgPrincipalStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgPrincipalStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self { pool, query_timeout }
    }
}

#[async_trait]
impl PrincipalStore for PgPrincipalStore {
    async fn find_principal(&self, user_id: i64) -> StoreResult<Option<Principal>> {
        let query = r#"
            SELECT u.id, u.name, u.email, u.activated,
                   COALESCE(array_agg(p.code) FILTER (WHERE p.code IS NOT NULL), '{}') AS permissions
            FROM users u
            LEFT JOIN users_permissions up ON up.user_id = u.id
            LEFT JOIN permissions p ON p.id = up.permission_id
            WHERE u.id = $1
            GROUP BY u.id
        "#;

        let row = with_timeout(
            self.query_timeout,
            sqlx::query(query).bind(user_id).fetch_optional(&self.pool),
        )
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let permissions: Vec<String> = row.try_get("permissions")?;
        let principal = Principal::user(
            row.try_get("id")?,
            row.try_get::<String, _>("name")?,
            row.try_get::<String, _>("email")?,
            row.try_get("activated")?,
        )
        .with_permissions(permissions);

        tracing::debug!(
            "Loaded principal {} with {} permission(s)",
            user_id,
            principal.permissions.len()
        );
        Ok(Some(principal))
    }
}
