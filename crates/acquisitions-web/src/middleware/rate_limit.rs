//! Per-key sliding-window request limiting.
//!
//! Each key keeps two fixed buckets: the current window and the one before
//! it. The request rate is estimated as
//! `current + previous * (1 - elapsed / window)`, which smooths the burst a
//! plain fixed window allows at its boundary while using constant memory per
//! key. A request is admitted while the estimate is below the limit, and only
//! admitted requests are counted.

use std::time::{Duration, Instant};

use acquisitions_core::Role;
use dashmap::DashMap;

use crate::config::SecurityConfig;

/// Which limit applies to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateTier {
    Admin,
    User,
    Guest,
}

impl RateTier {
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::Admin) => RateTier::Admin,
            Some(Role::User) => RateTier::User,
            None => RateTier::Guest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RateTier::Admin => "admin",
            RateTier::User => "user",
            RateTier::Guest => "guest",
        }
    }

    /// Maximum requests per window for this tier.
    pub fn limit(self, config: &SecurityConfig) -> u32 {
        match self {
            RateTier::Admin => config.admin_limit,
            RateTier::User => config.user_limit,
            RateTier::Guest => config.guest_limit,
        }
    }

    /// Rule name, e.g. `guest-rate-limit`.
    pub fn rule_name(self) -> String {
        format!("{}-rate-limit", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateDecision {
    pub allowed: bool,
    pub limit: u32,
    /// Requests still available in the window, rounded down.
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    started: Instant,
    current: u32,
    previous: u32,
}

pub struct SlidingWindowLimiter {
    window: Duration,
    windows: DashMap<String, WindowState>,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            windows: DashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a request for `key` at `now` if the estimated rate is still
    /// below `max`.
    pub fn check(&self, key: &str, max: u32, now: Instant) -> RateDecision {
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(WindowState {
                started: now,
                current: 0,
                previous: 0,
            });
        let state = entry.value_mut();
        self.roll(state, now);

        let estimate = self.estimate(state, now);
        let allowed = estimate < f64::from(max);
        if allowed {
            state.current += 1;
        }

        let used = self.estimate(state, now);
        let remaining = (f64::from(max) - used).max(0.0).floor() as u32;

        RateDecision {
            allowed,
            limit: max,
            remaining,
        }
    }

    /// Drops keys that have seen no traffic for two full windows.
    pub fn purge_idle(&self, now: Instant) {
        let horizon = self.window * 2;
        self.windows
            .retain(|_, state| now.saturating_duration_since(state.started) < horizon);
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    fn roll(&self, state: &mut WindowState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.started);
        let windows_passed = elapsed.as_nanos() / self.window.as_nanos().max(1);
        match windows_passed {
            0 => {}
            1 => {
                state.previous = state.current;
                state.current = 0;
                state.started += self.window;
            }
            n => {
                state.previous = 0;
                state.current = 0;
                let skip = u32::try_from(n).unwrap_or(u32::MAX);
                state.started += self.window.saturating_mul(skip);
            }
        }
    }

    fn estimate(&self, state: &WindowState, now: Instant) -> f64 {
        let into_window = now.saturating_duration_since(state.started).as_secs_f64();
        let weight = (1.0 - into_window / self.window.as_secs_f64()).clamp(0.0, 1.0);
        f64::from(state.current) + f64::from(state.previous) * weight
    }
}
