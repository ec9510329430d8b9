//! Replay window on signed message timestamps.

use photoguard_core::constants::FRESHNESS_WINDOW_SECS;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of "now" in unix seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    now: Arc<AtomicI64>,
}

impl FixedClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Accepts timestamps no older than [`FRESHNESS_WINDOW_SECS`] and not in the future.
#[derive(Clone)]
pub struct FreshnessGuard {
    clock: Arc<dyn Clock>,
}

impl FreshnessGuard {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    pub fn is_fresh(&self, timestamp: i64) -> bool {
        Self::is_fresh_at(timestamp, self.clock.now())
    }

    pub fn is_fresh_at(timestamp: i64, now: i64) -> bool {
        match now.checked_sub(timestamp) {
            Some(age) => (0..=FRESHNESS_WINDOW_SECS).contains(&age),
            None => false,
        }
    }
}

impl Default for FreshnessGuard {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
