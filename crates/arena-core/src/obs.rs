//! Tracing initialisation and structured observability events.
//!
//! Every event carries the `execution_id` it belongs to, so orchestrator
//! logs can be sliced per execution. Call [`init_tracing`] once at program
//! start; subsequent calls are silently ignored (the global subscriber can
//! only be set once per process).

use tracing::{info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initialise the global tracing subscriber.
///
/// * `json` — when `true`, emit newline-delimited JSON log lines
///   (useful for log aggregation pipelines).
/// * `level` — default verbosity when `RUST_LOG` is not set.
///
/// Respects the `RUST_LOG` environment variable for fine-grained filtering.
/// Safe to call multiple times; only the first call takes effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

/// RAII guard that enters an execution-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = ExecutionSpan::enter(&request.execution_id);
/// // All tracing calls are now tagged with this execution_id.
/// ```
pub struct ExecutionSpan {
    _span: tracing::span::EnteredSpan,
}

impl ExecutionSpan {
    /// Create and enter a span tagged with the execution id.
    pub fn enter(execution_id: &Uuid) -> Self {
        let span = tracing::info_span!("arena.execution", execution_id = %execution_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: an execution was submitted.
pub fn emit_execution_started(execution_id: &Uuid, participant_id: &str, source_digest: &str) {
    info!(
        event = "exec.started",
        execution_id = %execution_id,
        participant_id = %participant_id,
        source_digest = %source_digest,
    );
}

/// Emit event: an execution finished with the given outcome label.
pub fn emit_execution_finished(execution_id: &Uuid, outcome: &str, elapsed_ms: u64) {
    info!(
        event = "exec.finished",
        execution_id = %execution_id,
        outcome = %outcome,
        elapsed_ms = elapsed_ms,
    );
}

/// Emit event: one diagnostic line the agent logged from inside the sandbox.
pub fn emit_agent_log(execution_id: &Uuid, line: &str) {
    info!(event = "exec.agent_log", execution_id = %execution_id, line = %line);
}

/// Emit event: a returned guess failed validation (warning level).
pub fn emit_guess_rejected(execution_id: &Uuid, reason: &dyn std::fmt::Display) {
    tracing::warn!(event = "exec.guess_rejected", execution_id = %execution_id, reason = %reason);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_span_create() {
        // Just ensure ExecutionSpan::enter doesn't panic.
        let _span = ExecutionSpan::enter(&Uuid::new_v4());
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing(false, Level::WARN);
        init_tracing(true, Level::INFO);
    }
}
