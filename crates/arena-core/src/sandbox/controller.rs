//! The sandbox execution controller.
//!
//! `submit()` runs one agent's source against one snapshot in a fresh,
//! single-use interpreter on its own blocking task, enforces the structural
//! and resource limits from [`ControllerConfig`], validates the returned
//! guess, records telemetry, and converts every internal error into a tagged
//! [`ExecutionOutcome::Failure`] — nothing escapes as a panic or host fault.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::metrics::METRICS;
use crate::obs;
use crate::telemetry::{ExecutionRecord, TelemetrySink};

use super::capability::CapabilitySet;
use super::request::{ExecutionOutcome, ExecutionRequest, ExecutionResult, FailureKind};
use super::script::{EvalError, Interp, InterpLimits, LoadError, Program};
use super::validator::validate_guess;

/// Construction-time configuration for a [`SandboxController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Wall-clock budget per execution, enforced inside the interpreter.
    pub timeout_ms: u64,
    /// Extra margin for the host-side backstop timer.
    pub grace_ms: u64,
    /// Interpreter step budget per execution.
    pub fuel_budget: u64,
    /// Maximum user-function call depth.
    pub max_call_depth: usize,
    /// Largest accepted agent source, in bytes.
    pub max_source_bytes: usize,
    /// Largest accepted agent source, in lines.
    pub max_source_lines: usize,
    /// Maximum log lines retained per execution.
    pub max_log_lines: usize,
    /// The capability groups granted to every execution.
    pub capabilities: CapabilitySet,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            grace_ms: 50,
            fuel_budget: 1_000_000_000,
            max_call_depth: 64,
            max_source_bytes: 16 * 1024,
            max_source_lines: 500,
            max_log_lines: 100,
            capabilities: CapabilitySet::safe_default(),
        }
    }
}

impl ControllerConfig {
    fn interp_limits(&self) -> InterpLimits {
        InterpLimits {
            timeout: Duration::from_millis(self.timeout_ms),
            fuel_budget: self.fuel_budget,
            max_call_depth: self.max_call_depth,
            max_log_lines: self.max_log_lines,
        }
    }
}

/// Runs untrusted agent code under isolation, time, and capability limits.
///
/// The telemetry sink is injected, not ambient: each controller writes to
/// exactly the sink it was built with.
pub struct SandboxController {
    config: ControllerConfig,
    telemetry: Arc<TelemetrySink>,
}

impl SandboxController {
    pub fn new(config: ControllerConfig, telemetry: Arc<TelemetrySink>) -> Self {
        Self { config, telemetry }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The sink this controller records into.
    pub fn telemetry(&self) -> &Arc<TelemetrySink> {
        &self.telemetry
    }

    /// Execute one request to completion and return its tagged result.
    ///
    /// Concurrent calls are independent — each gets its own interpreter on
    /// its own blocking task, and results correlate to requests only through
    /// `execution_id`.
    pub async fn submit(&self, request: ExecutionRequest) -> ExecutionResult {
        let started = Instant::now();
        METRICS.inc_submitted();
        obs::emit_execution_started(
            &request.execution_id,
            &request.participant_id,
            &request.source_digest,
        );

        let (outcome, logs) = self.execute(&request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome.failure_kind() {
            Some(FailureKind::Timeout) => METRICS.inc_timed_out(),
            Some(FailureKind::Validation) => METRICS.inc_guess_rejected(),
            Some(FailureKind::StateInconsistency) => METRICS.inc_state_inconsistency(),
            _ => {}
        }

        for line in &logs {
            obs::emit_agent_log(&request.execution_id, line);
        }
        obs::emit_execution_finished(&request.execution_id, &outcome.label(), elapsed_ms);

        self.telemetry.record(ExecutionRecord {
            execution_id: request.execution_id,
            participant_id: request.participant_id.clone(),
            success: outcome.is_success(),
            failure_kind: outcome.failure_kind(),
            elapsed_ms,
            recorded_at: chrono::Utc::now(),
        });

        ExecutionResult {
            execution_id: request.execution_id,
            outcome,
            elapsed_ms,
            logs,
        }
    }

    async fn execute(&self, request: &ExecutionRequest) -> (ExecutionOutcome, Vec<String>) {
        // Structural source limits, checked before any unit is spawned.
        if request.agent_code.len() > self.config.max_source_bytes {
            return (
                failure(
                    FailureKind::Structural,
                    format!(
                        "agent source of {} bytes exceeds the limit of {}",
                        request.agent_code.len(),
                        self.config.max_source_bytes
                    ),
                ),
                Vec::new(),
            );
        }
        let line_count = request.agent_code.lines().count();
        if line_count > self.config.max_source_lines {
            return (
                failure(
                    FailureKind::Structural,
                    format!(
                        "agent source of {line_count} lines exceeds the limit of {}",
                        self.config.max_source_lines
                    ),
                ),
                Vec::new(),
            );
        }

        let source = request.agent_code.clone();
        let snapshot = request.snapshot.clone();
        let capabilities = self.config.capabilities.clone();
        let limits = self.config.interp_limits();

        // Fresh single-use unit per call. The closure owns every input: the
        // agent sees copies, never host state.
        let unit = tokio::task::spawn_blocking(move || {
            let program = match Program::load(&source) {
                Ok(program) => program,
                Err(error) => return (Err(UnitFault::Load(error)), Vec::new()),
            };
            let mut interp = Interp::new(&program, &snapshot, &capabilities, &limits);
            let result = interp.run().map_err(UnitFault::Eval);
            let logs = interp.take_logs();
            (result, logs)
        });

        let host_budget = Duration::from_millis(self.config.timeout_ms + self.config.grace_ms);
        match tokio::time::timeout(host_budget, unit).await {
            // Host backstop fired. The unit's engine-level deadline has
            // already expired too; whatever it eventually returns is dropped
            // with the detached task.
            Err(_elapsed) => (
                failure(
                    FailureKind::Timeout,
                    format!(
                        "execution exceeded its {}ms deadline",
                        self.config.timeout_ms
                    ),
                ),
                Vec::new(),
            ),
            Ok(Err(join_error)) => (
                failure(
                    FailureKind::Runtime,
                    format!("agent task failed: {join_error}"),
                ),
                Vec::new(),
            ),
            Ok(Ok((Err(fault), logs))) => (fault.into_outcome(), logs),
            Ok(Ok((Ok(value), logs))) => match validate_guess(&value, &request.snapshot) {
                Ok(guess) => (ExecutionOutcome::Success { guess }, logs),
                Err(rejection) => {
                    obs::emit_guess_rejected(&request.execution_id, &rejection);
                    (
                        failure(FailureKind::Validation, rejection.to_string()),
                        logs,
                    )
                }
            },
        }
    }
}

fn failure(kind: FailureKind, message: String) -> ExecutionOutcome {
    ExecutionOutcome::Failure { kind, message }
}

/// What went wrong inside the isolated unit.
enum UnitFault {
    Load(LoadError),
    Eval(EvalError),
}

impl UnitFault {
    fn into_outcome(self) -> ExecutionOutcome {
        match self {
            UnitFault::Load(error) => failure(FailureKind::Structural, error.to_string()),
            UnitFault::Eval(error) => {
                let kind = match &error {
                    EvalError::DeadlineExceeded { .. } | EvalError::FuelExhausted { .. } => {
                        FailureKind::Timeout
                    }
                    EvalError::Inference(_) => FailureKind::StateInconsistency,
                    _ => FailureKind::Runtime,
                };
                failure(kind, error.to_string())
            }
        }
    }
}
