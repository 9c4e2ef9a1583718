use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Largest `page_size` a deployment may allow
pub const MAX_PAGE_SIZE_CEILING: i64 = 1_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub store: StoreBackend,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Which `PuzzleStore` implementation the server runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub query_timeout_secs: u64,
    pub max_idle_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_rate_limiting: bool,
    pub rate_limit_rps: f64,
    pub rate_limit_burst: u32,
    pub rate_limit_idle_secs: u64,
    pub rate_limit_sweep_secs: u64,
    pub trust_proxy: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

impl DatabaseConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        Self::preset(environment).with_env_overrides().sanitized()
    }

    fn preset(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    /// Pulls overridden values back into ranges the filter and rate limiter
    /// can work with, falling back to the environment preset.
    fn sanitized(mut self) -> Self {
        let preset = Self::preset(self.environment);

        let rps = self.api.rate_limit_rps;
        if !rps.is_finite() || rps < 0.0 {
            tracing::warn!("Invalid API_RATE_LIMIT_RPS {}, using {}", rps, preset.api.rate_limit_rps);
            self.api.rate_limit_rps = preset.api.rate_limit_rps;
        }
        if self.api.rate_limit_burst == 0 {
            tracing::warn!("API_RATE_LIMIT_BURST must be at least 1, using {}", preset.api.rate_limit_burst);
            self.api.rate_limit_burst = preset.api.rate_limit_burst;
        }

        let max = self.filter.max_page_size;
        if !(1..=MAX_PAGE_SIZE_CEILING).contains(&max) {
            tracing::warn!(
                "FILTER_MAX_PAGE_SIZE {} outside 1..={}, clamping",
                max,
                MAX_PAGE_SIZE_CEILING
            );
            self.filter.max_page_size = max.clamp(1, MAX_PAGE_SIZE_CEILING);
        }
        let default = self.filter.default_page_size;
        if !(1..=self.filter.max_page_size).contains(&default) {
            tracing::warn!("FILTER_DEFAULT_PAGE_SIZE {} outside 1..={}, clamping", default, self.filter.max_page_size);
            self.filter.default_page_size = default.clamp(1, self.filter.max_page_size);
        }

        self
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("STORE_BACKEND") {
            self.store = match v.to_ascii_lowercase().as_str() {
                "memory" | "mem" => StoreBackend::Memory,
                "postgres" | "pg" => StoreBackend::Postgres,
                other => {
                    tracing::warn!("Unknown STORE_BACKEND '{}', keeping {:?}", other, self.store);
                    self.store
                }
            };
        }

        // Filter overrides
        if let Ok(v) = env::var("FILTER_DEFAULT_PAGE_SIZE") {
            self.filter.default_page_size = v.parse().unwrap_or(self.filter.default_page_size);
        }
        if let Ok(v) = env::var("FILTER_MAX_PAGE_SIZE") {
            self.filter.max_page_size = v.parse().unwrap_or(self.filter.max_page_size);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_QUERY_TIMEOUT_SECS") {
            self.database.query_timeout_secs = v.parse().unwrap_or(self.database.query_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_MAX_IDLE_SECS") {
            self.database.max_idle_secs = v.parse().unwrap_or(self.database.max_idle_secs);
        }

        // API overrides
        if let Some(port) = env::var("API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_RPS") {
            self.api.rate_limit_rps = v.parse().unwrap_or(self.api.rate_limit_rps);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_BURST") {
            self.api.rate_limit_burst = v.parse().unwrap_or(self.api.rate_limit_burst);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_IDLE_SECS") {
            self.api.rate_limit_idle_secs = v.parse().unwrap_or(self.api.rate_limit_idle_secs);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_SWEEP_SECS") {
            self.api.rate_limit_sweep_secs = v.parse().unwrap_or(self.api.rate_limit_sweep_secs);
        }
        if let Ok(v) = env::var("API_TRUST_PROXY") {
            self.api.trust_proxy = v.parse().unwrap_or(self.api.trust_proxy);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            store: StoreBackend::Postgres,
            filter: FilterConfig {
                default_page_size: 20,
                max_page_size: 100,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                query_timeout_secs: 3,
                max_idle_secs: 15 * 60,
            },
            api: ApiConfig {
                port: 4000,
                enable_rate_limiting: true,
                rate_limit_rps: 2.0,
                rate_limit_burst: 4,
                rate_limit_idle_secs: 3 * 60,
                rate_limit_sweep_secs: 60,
                trust_proxy: false,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                jwt_secret: "development-only-secret-change-me".to_string(),
                jwt_expiry_hours: 24,
                cors_origins: vec![],
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.api.rate_limit_rps = 5.0;
        config.api.rate_limit_burst = 10;
        config.security.jwt_secret = String::new();
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.api.rate_limit_rps = 10.0;
        config.api.rate_limit_burst = 20;
        config.api.trust_proxy = true;
        config.security.jwt_secret = String::new();
        config.security.jwt_expiry_hours = 4;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
