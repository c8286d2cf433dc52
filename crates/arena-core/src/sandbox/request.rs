//! Execution request and result types crossing the orchestrator boundary.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::state::GameStateSnapshot;

/// One agent execution, as submitted by the orchestrator.
///
/// The `execution_id` is the only correlation token between a submission and
/// its eventual [`ExecutionResult`]; completion order carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Correlation token, unique per submission.
    pub execution_id: Uuid,
    /// Orchestrator-assigned id of the submitting player.
    pub participant_id: String,
    /// Agent source text.
    pub agent_code: String,
    /// The authoritative snapshot this execution runs against.
    pub snapshot: GameStateSnapshot,
    /// SHA-256 of `agent_code`, hex-encoded; used to correlate log lines
    /// with a specific revision of a participant's code.
    pub source_digest: String,
}

impl ExecutionRequest {
    /// Build a request with a fresh execution id and source digest.
    pub fn new(
        participant_id: impl Into<String>,
        agent_code: impl Into<String>,
        snapshot: GameStateSnapshot,
    ) -> Self {
        let agent_code = agent_code.into();
        Self {
            execution_id: Uuid::new_v4(),
            participant_id: participant_id.into(),
            source_digest: source_digest(&agent_code),
            agent_code,
            snapshot,
        }
    }
}

/// SHA-256 of agent source, hex-encoded.
pub fn source_digest(agent_code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(agent_code.as_bytes());
    hex::encode(hasher.finalize())
}

/// The failure half of the execution taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The source never ran: size limits, parse error, or missing
    /// `make_guess` entry point.
    Structural,
    /// The agent failed while running; the message is the agent's own fault
    /// text, forwarded verbatim.
    Runtime,
    /// The execution was cut off at its deadline (or fuel budget).
    Timeout,
    /// The agent returned a value the validator rejected.
    Validation,
    /// The inference engine proved the snapshot logically impossible — an
    /// orchestrator-side bug, reported instead of guessed around.
    StateInconsistency,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Structural => write!(f, "structural"),
            FailureKind::Runtime => write!(f, "runtime"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Validation => write!(f, "validation"),
            FailureKind::StateInconsistency => write!(f, "state_inconsistency"),
        }
    }
}

/// What an execution produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// The agent returned a guess that passed validation.
    Success { guess: Vec<usize> },
    /// Anything else, tagged by kind with a human-readable message.
    Failure { kind: FailureKind, message: String },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    /// The failure kind, if this is a failure.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ExecutionOutcome::Success { .. } => None,
            ExecutionOutcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Short tag for log events.
    pub fn label(&self) -> String {
        match self {
            ExecutionOutcome::Success { .. } => "success".to_string(),
            ExecutionOutcome::Failure { kind, .. } => kind.to_string(),
        }
    }
}

/// The complete, correlated result of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Echoes [`ExecutionRequest::execution_id`].
    pub execution_id: Uuid,
    pub outcome: ExecutionOutcome,
    /// Wall-clock time spent, in milliseconds.
    pub elapsed_ms: u64,
    /// Lines the agent emitted through the `log` builtin, in order.
    pub logs: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::KeywordPool;

    fn snapshot() -> GameStateSnapshot {
        let pool: KeywordPool = ["a", "b"].into_iter().collect();
        GameStateSnapshot::new(pool, 1)
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = ExecutionRequest::new("p1", "fn make_guess(s) { return [0]; }", snapshot());
        let b = ExecutionRequest::new("p1", "fn make_guess(s) { return [0]; }", snapshot());
        assert_ne!(a.execution_id, b.execution_id);
        // Same source, same digest.
        assert_eq!(a.source_digest, b.source_digest);
    }

    #[test]
    fn test_source_digest_is_hex_sha256() {
        let digest = source_digest("x");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_outcome_serde_tagging() {
        let outcome = ExecutionOutcome::Failure {
            kind: FailureKind::Timeout,
            message: "deadline".into(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains(r#""status":"failure""#));
        assert!(json.contains(r#""kind":"timeout""#));
        let back: ExecutionOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(outcome, back);
    }

    #[test]
    fn test_result_serde_roundtrip() {
        let result = ExecutionResult {
            execution_id: Uuid::new_v4(),
            outcome: ExecutionOutcome::Success { guess: vec![0] },
            elapsed_ms: 12,
            logs: vec!["hello".into()],
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: ExecutionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }
}
