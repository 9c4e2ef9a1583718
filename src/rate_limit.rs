use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::ApiConfig;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Tokens added per second
    pub rps: f64,
    /// Bucket capacity
    pub burst: u32,
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
}

impl From<&ApiConfig> for RateLimitConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            enabled: api.enable_rate_limiting,
            rps: api.rate_limit_rps,
            burst: api.rate_limit_burst,
            idle_timeout: Duration::from_secs(api.rate_limit_idle_secs),
            sweep_interval: Duration::from_secs(api.rate_limit_sweep_secs),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Limited,
}

/// One continuous token bucket per client identity.
///
/// Buckets sit in a sharded map so unrelated clients never contend on the
/// same lock; a bucket's fields are only touched under its entry guard.
pub struct RateLimiter {
    buckets: DashMap<String, TokenBucket>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn admit(&self, identity: &str) -> Admission {
        self.admit_at(identity, Instant::now())
    }

    fn admit_at(&self, identity: &str, now: Instant) -> Admission {
        if !self.config.enabled {
            return Admission::Allowed;
        }

        let mut bucket = self
            .buckets
            .entry(identity.to_string())
            .or_insert_with(|| TokenBucket::full(self.config.burst, now));

        if bucket.take(now, self.config.burst, self.config.rps) {
            Admission::Allowed
        } else {
            Admission::Limited
        }
    }

    pub fn tracked(&self) -> usize {
        self.buckets.len()
    }

    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        self.prune_idle_at(max_idle, Instant::now())
    }

    fn prune_idle_at(&self, max_idle: Duration, now: Instant) -> usize {
        if max_idle.is_zero() {
            return 0;
        }
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| !bucket.is_idle(now, max_idle));
        before.saturating_sub(self.buckets.len())
    }

    /// Periodically drops buckets idle for longer than `idle_timeout`.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        let period = self.config.sweep_interval.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.prune_idle(self.config.idle_timeout);
                if removed > 0 {
                    tracing::debug!("Rate limiter swept {} idle bucket(s), {} remain", removed, self.tracked());
                }
            }
        })
    }
}

#[derive(Clone, Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(burst: u32, now: Instant) -> Self {
        Self {
            tokens: burst as f64,
            last_refill: now,
        }
    }

    fn take(&mut self, now: Instant, burst: u32, rps: f64) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rps).min(burst as f64);
        self.last_refill = now;
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn is_idle(&self, now: Instant, max_idle: Duration) -> bool {
        now.saturating_duration_since(self.last_refill) >= max_idle
    }
}
