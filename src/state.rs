use std::sync::Arc;

use crate::auth::{AuthGuard, PrincipalStore};
use crate::config::AppConfig;
use crate::database::PuzzleStore;
use crate::rate_limit::{RateLimitConfig, RateLimiter};

/// Shared handles passed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PuzzleStore>,
    pub guard: AuthGuard,
    pub limiter: Arc<RateLimiter>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn PuzzleStore>,
        principals: Arc<dyn PrincipalStore>,
    ) -> Self {
        let guard = AuthGuard::new(config.security.jwt_secret.clone(), principals);
        let limiter = Arc::new(RateLimiter::new(RateLimitConfig::from(&config.api)));
        Self {
            store,
            guard,
            limiter,
            config: Arc::new(config),
        }
    }
}
