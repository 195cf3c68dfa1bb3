use std::sync::Arc;
use std::time::{Duration, Instant};

use acquisitions_core::UserStore;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::SlidingWindowLimiter;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn UserStore>,
    pub limiter: Arc<SlidingWindowLimiter>,
    /// Process start, reported as `uptime` by `/health`.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Arc<dyn UserStore>) -> Self {
        let window = Duration::from_secs(config.security.window_secs);
        Self {
            config: Arc::new(config),
            store,
            limiter: Arc::new(SlidingWindowLimiter::new(window)),
            started_at: Instant::now(),
        }
    }
}

#[cfg(test)]
pub const TEST_JWT_SECRET: &str = "test-secret-0123456789abcdef0123456789";

#[cfg(test)]
pub fn test_state_with(config: ServerConfig) -> AppState {
    AppState::new(config, Arc::new(acquisitions_core::MemoryUserStore::new()))
}

#[cfg(test)]
pub fn test_state() -> AppState {
    let mut config = ServerConfig::default();
    config.database.url = Some(crate::config::MEMORY_DATABASE_URL.to_string());
    config.auth.jwt_secret = TEST_JWT_SECRET.to_string();
    test_state_with(config)
}
