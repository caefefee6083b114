//! Sliding-window failure counting with per-subject lockout.
//!
//! Windows are independent across subjects; the map-level mutex only guards the lookup,
//! there is no cross-subject coordination. Expired failures are dropped lazily — counting
//! only ever considers in-window entries, and `record_failure` prunes opportunistically to
//! bound memory.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Duration, Utc};

use crate::{config::CoreConfig, store::Clock};

/// Outcome of a lockout check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStatus {
    /// The subject is locked out. Every new failure while locked pushes `until` forward
    /// (sliding lockout: most recent failure + window).
    Locked {
        /// When the lockout expires, assuming no further failures.
        until: DateTime<Utc>,
    },
    /// The subject may attempt; `remaining` failures are left before lockout.
    Open {
        /// Failures left before the subject locks.
        remaining: u32,
    },
}

/// Bounds the failure rate per subject.
pub struct RateLimiter {
    max_failures: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl RateLimiter {
    /// Build a limiter from configuration and an injected clock.
    pub fn new(config: &CoreConfig, clock: Arc<dyn Clock>) -> Self {
        RateLimiter {
            max_failures: config.max_failures,
            window: config.lockout_window,
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a failed attempt for the subject at the current instant.
    pub fn record_failure(&self, subject: &str) {
        let now = self.clock.now();
        let cutoff = now - self.window;
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let failures = windows.entry(subject.to_owned()).or_default();
        failures.retain(|at| *at > cutoff);
        failures.push(now);
    }

    /// Check whether the subject is currently locked out.
    pub fn status(&self, subject: &str) -> RateLimitStatus {
        let now = self.clock.now();
        let cutoff = now - self.window;
        let windows = self.windows.lock().expect("rate limiter mutex poisoned");
        let Some(failures) = windows.get(subject) else {
            return RateLimitStatus::Open {
                remaining: self.max_failures,
            };
        };
        let in_window = failures.iter().filter(|at| **at > cutoff).count() as u32;
        if in_window >= self.max_failures {
            match failures.iter().max() {
                Some(latest) => RateLimitStatus::Locked {
                    until: *latest + self.window,
                },
                None => RateLimitStatus::Open {
                    remaining: self.max_failures,
                },
            }
        } else {
            RateLimitStatus::Open {
                remaining: self.max_failures - in_window,
            }
        }
    }

    /// Forget the subject's failures. Called only on a verified, non-locked success.
    pub fn clear(&self, subject: &str) {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        windows.remove(subject);
    }
}
