//! Global atomic counters for arena observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single `tracing::info!`
//! event (e.g. at the end of a round).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters — no allocations, no locking.
pub struct Metrics {
    executions_submitted: AtomicU64,
    executions_timed_out: AtomicU64,
    guesses_rejected: AtomicU64,
    state_inconsistencies: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            executions_submitted: AtomicU64::new(0),
            executions_timed_out: AtomicU64::new(0),
            guesses_rejected: AtomicU64::new(0),
            state_inconsistencies: AtomicU64::new(0),
        }
    }

    /// Increment the submitted-executions counter by one.
    pub fn inc_submitted(&self) {
        self.executions_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the timed-out-executions counter by one.
    pub fn inc_timed_out(&self) {
        self.executions_timed_out.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the rejected-guesses counter by one.
    pub fn inc_guess_rejected(&self) {
        self.guesses_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the state-inconsistencies counter by one.
    pub fn inc_state_inconsistency(&self) {
        self.state_inconsistencies.fetch_add(1, Ordering::Relaxed);
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call this at natural boundaries (end of a round, shutdown) rather
    /// than on every increment.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            executions_submitted = self.executions_submitted(),
            executions_timed_out = self.executions_timed_out(),
            guesses_rejected = self.guesses_rejected(),
            state_inconsistencies = self.state_inconsistencies(),
        );
    }

    pub fn executions_submitted(&self) -> u64 {
        self.executions_submitted.load(Ordering::Relaxed)
    }

    pub fn executions_timed_out(&self) -> u64 {
        self.executions_timed_out.load(Ordering::Relaxed)
    }

    pub fn guesses_rejected(&self) -> u64 {
        self.guesses_rejected.load(Ordering::Relaxed)
    }

    pub fn state_inconsistencies(&self) -> u64 {
        self.state_inconsistencies.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.executions_submitted.store(0, Ordering::Relaxed);
        self.executions_timed_out.store(0, Ordering::Relaxed);
        self.guesses_rejected.store(0, Ordering::Relaxed);
        self.state_inconsistencies.store(0, Ordering::Relaxed);
    }
}
