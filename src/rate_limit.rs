//! Login-attempt rate limiting
//!
//! A fixed-window counter store keyed by identity or client address,
//! shared between concurrent request handlers behind a lock. The limiter is
//! injected as a dependency so multi-instance deployments can swap it for a
//! shared store.

use crate::config::RateLimitConfig;
use crate::{AuthError, AuthResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

const CLEANUP_THRESHOLD: usize = 10_000;

/// Attempt limiter with in-memory fixed-window counters
#[derive(Debug)]
pub struct AttemptLimiter {
    config: RateLimitConfig,
    storage: Arc<Mutex<InMemoryStorage>>,
}

impl Clone for AttemptLimiter {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            storage: Arc::clone(&self.storage),
        }
    }
}

/// Maps key -> (attempt_count, window_start_time)
#[derive(Debug, Default)]
struct InMemoryStorage {
    counters: HashMap<String, (u32, u64)>,
}

/// Outcome of one rate-limit check
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Attempts recorded in the current window, including this one
    pub current: u32,
    /// Maximum allowed attempts per window
    pub limit: u32,
    /// Seconds until the current window resets
    pub reset_in: u64,
    /// Whether this attempt is allowed
    pub allowed: bool,
}

impl AttemptLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            storage: Arc::new(Mutex::new(InMemoryStorage::default())),
        }
    }

    /// Strict limiter for credential endpoints (5 attempts per 15 minutes)
    pub fn strict() -> Self {
        Self::new(RateLimitConfig {
            max_attempts: 5,
            window_seconds: 15 * 60,
        })
    }

    /// Record an attempt for `key` and check it against the window.
    ///
    /// Storage failure is an infrastructure error, never an implicit allow.
    pub fn check(&self, key: &str) -> AuthResult<RateLimitInfo> {
        let mut storage = self
            .storage
            .lock()
            .map_err(|_| AuthError::service_unavailable("rate limit storage lock poisoned"))?;

        let current_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::service_unavailable("system clock before epoch"))?
            .as_secs();

        let window_size = self.config.window_seconds;
        let (count, window_start) = storage
            .counters
            .get(key)
            .copied()
            .unwrap_or((0, current_time));

        let elapsed = current_time.saturating_sub(window_start);
        let (new_count, new_window_start) = if elapsed >= window_size {
            (1u32, current_time)
        } else {
            (count + 1, window_start)
        };

        storage
            .counters
            .insert(key.to_string(), (new_count, new_window_start));

        if storage.counters.len() > CLEANUP_THRESHOLD {
            storage
                .counters
                .retain(|_, &mut (_, start)| current_time.saturating_sub(start) < window_size * 2);
        }

        let reset_at = new_window_start + window_size;
        Ok(RateLimitInfo {
            current: new_count,
            limit: self.config.max_attempts,
            reset_in: reset_at.saturating_sub(current_time),
            allowed: new_count <= self.config.max_attempts,
        })
    }
}
