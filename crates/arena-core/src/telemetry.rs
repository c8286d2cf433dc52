//! Bounded-history recorder of execution outcomes.
//!
//! The sink is an explicitly injected dependency: construct one, wrap it in
//! an `Arc`, and hand it to every
//! [`SandboxController`](crate::sandbox::controller::SandboxController) that
//! should feed it. There is deliberately no process-wide instance — tests and
//! multi-tenant hosts each get their own. Writes are serialized behind a
//! mutex; retention is a fixed-capacity ring buffer that evicts the oldest
//! record first.

use std::collections::{BTreeSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sandbox::request::FailureKind;

/// One recorded execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub execution_id: Uuid,
    pub participant_id: String,
    pub success: bool,
    /// Present when `success` is false.
    pub failure_kind: Option<FailureKind>,
    pub elapsed_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Per-participant aggregate over the retained history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantStats {
    pub executions: usize,
    pub success_rate: f64,
    pub mean_time_ms: f64,
    pub max_time_ms: u64,
    /// Failure kinds of the most recent failed executions, newest first
    /// (at most five).
    pub recent_failure_kinds: Vec<FailureKind>,
}

/// Whole-arena aggregate over the retained history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub executions: usize,
    pub success_rate: f64,
    pub mean_time_ms: f64,
    pub peak_time_ms: u64,
    pub participants: usize,
}

/// How many failure kinds `participant_stats` reports back.
const RECENT_FAILURES: usize = 5;

/// Ring-buffer telemetry store.
#[derive(Debug)]
pub struct TelemetrySink {
    capacity: usize,
    records: Mutex<VecDeque<ExecutionRecord>>,
}

impl Default for TelemetrySink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl TelemetrySink {
    pub const DEFAULT_CAPACITY: usize = 1000;

    /// Create a sink retaining at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    /// Append a record, evicting the oldest when at capacity.
    pub fn record(&self, record: ExecutionRecord) {
        let mut records = self.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when nothing has been recorded (or all was cleared).
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all retained history.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Aggregate the retained records of one participant.
    pub fn participant_stats(&self, participant_id: &str) -> ParticipantStats {
        let records = self.lock();
        let mine: Vec<&ExecutionRecord> = records
            .iter()
            .filter(|r| r.participant_id == participant_id)
            .collect();

        if mine.is_empty() {
            return ParticipantStats::default();
        }

        let successes = mine.iter().filter(|r| r.success).count();
        let total_ms: u64 = mine.iter().map(|r| r.elapsed_ms).sum();
        let max_time_ms = mine.iter().map(|r| r.elapsed_ms).max().unwrap_or(0);
        let recent_failure_kinds = mine
            .iter()
            .rev()
            .filter_map(|r| r.failure_kind)
            .take(RECENT_FAILURES)
            .collect();

        ParticipantStats {
            executions: mine.len(),
            success_rate: successes as f64 / mine.len() as f64,
            mean_time_ms: total_ms as f64 / mine.len() as f64,
            max_time_ms,
            recent_failure_kinds,
        }
    }

    /// Aggregate all retained records.
    pub fn global_stats(&self) -> GlobalStats {
        let records = self.lock();
        if records.is_empty() {
            return GlobalStats::default();
        }

        let successes = records.iter().filter(|r| r.success).count();
        let total_ms: u64 = records.iter().map(|r| r.elapsed_ms).sum();
        let peak_time_ms = records.iter().map(|r| r.elapsed_ms).max().unwrap_or(0);
        let participants: BTreeSet<&str> = records
            .iter()
            .map(|r| r.participant_id.as_str())
            .collect();

        GlobalStats {
            executions: records.len(),
            success_rate: successes as f64 / records.len() as f64,
            mean_time_ms: total_ms as f64 / records.len() as f64,
            peak_time_ms,
            participants: participants.len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<ExecutionRecord>> {
        // A poisoned store still holds valid records; keep serving them.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
