use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::StoreResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User { id: i64, name: String, email: String },
}

/// The caller of a request, as resolved from its bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub identity: Identity,
    pub permissions: HashSet<String>,
    pub activated: bool,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self {
            identity: Identity::Anonymous,
            permissions: HashSet::new(),
            activated: false,
        }
    }

    pub fn user(id: i64, name: impl Into<String>, email: impl Into<String>, activated: bool) -> Self {
        Self {
            identity: Identity::User {
                id,
                name: name.into(),
                email: email.into(),
            },
            permissions: HashSet::new(),
            activated,
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self.identity, Identity::Anonymous)
    }

    pub fn user_id(&self) -> Option<i64> {
        match self.identity {
            Identity::User { id, .. } => Some(id),
            Identity::Anonymous => None,
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

/// Lookup of users and their granted permissions
#[async_trait]
pub trait PrincipalStore: Send + Sync + 'static {
    async fn find_principal(&self, user_id: i64) -> StoreResult<Option<Principal>>;
}

/// Fixed set of principals, for tests and `STORE_BACKEND=memory`
#[derive(Debug, Default)]
pub struct MemoryPrincipalStore {
    principals: RwLock<HashMap<i64, Principal>>,
}

impl MemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a principal; anonymous principals are ignored.
    pub async fn insert(&self, principal: Principal) {
        if let Some(id) = principal.user_id() {
            self.principals.write().await.insert(id, principal);
        }
    }
}

#[async_trait]
impl PrincipalStore for MemoryPrincipalStore {
    async fn find_principal(&self, user_id: i64) -> StoreResult<Option<Principal>> {
        Ok(self.principals.read().await.get(&user_id).cloned())
    }
}
