//! Account lockout state machine
//!
//! Tracks consecutive failed login attempts per identity and enforces a
//! timed lock once the threshold is crossed. The transitions are pure
//! functions over `(Identity, now)` so callers decide when state is
//! persisted and tests control time directly.
//!
//! Expired locks are cleaned up lazily: `is_locked` treats a past
//! `lock_until` as unlocked, but the field is only physically cleared by the
//! next recorded success or failure.

use crate::config::LockoutConfig;
use crate::identity::Identity;
use chrono::{DateTime, Duration, Utc};

/// Lockout policy: threshold and lock duration
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    max_attempts: u32,
    lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lock_duration: Duration::hours(2),
        }
    }
}

impl LockoutPolicy {
    pub fn new(max_attempts: u32, lock_duration: Duration) -> Self {
        Self {
            max_attempts,
            lock_duration,
        }
    }

    pub fn from_config(config: &LockoutConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            lock_duration: Duration::seconds(config.lock_duration_seconds as i64),
        }
    }

    /// Whether the identity is locked at `now`.
    ///
    /// A `lock_until` in the past reads as unlocked even though the field is
    /// still set; callers must not infer "never locked" from an absent value.
    pub fn is_locked(&self, identity: &Identity, now: DateTime<Utc>) -> bool {
        matches!(identity.lock_until, Some(until) if now < until)
    }

    /// Record one failed login attempt. Returns `true` when this failure
    /// applied a new lock.
    ///
    /// An expired lock is reset first so it does not count toward a new one:
    /// this failure becomes attempt 1. A still-live lock keeps counting
    /// attempts but is never extended or shortened.
    pub fn record_failure(&self, identity: &mut Identity, now: DateTime<Utc>) -> bool {
        match identity.lock_until {
            Some(until) if now < until => {
                identity.login_attempts += 1;
                return false;
            }
            Some(_) => {
                identity.login_attempts = 1;
                identity.lock_until = None;
            }
            None => {
                identity.login_attempts += 1;
            }
        }

        if identity.login_attempts >= self.max_attempts && identity.lock_until.is_none() {
            identity.lock_until = Some(now + self.lock_duration);
            tracing::warn!(
                user_id = %identity.id,
                attempts = identity.login_attempts,
                "account locked after repeated failed login attempts"
            );
            return true;
        }
        false
    }

    /// Record a successful login: clears attempts and any lock
    /// unconditionally.
    pub fn record_success(&self, identity: &mut Identity) {
        identity.login_attempts = 0;
        identity.lock_until = None;
    }
}
