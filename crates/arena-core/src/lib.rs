//! Keyword Arena Core Library
//!
//! The core subsystem of the keyword deduction game: a constraint inference
//! engine that proves hidden facts from the public guess history, and a
//! sandboxed execution controller that runs untrusted, user-submitted agents
//! against per-turn snapshots. The surrounding game (lobbies, rendering,
//! turn orchestration, transport) lives in the orchestrator; this crate's
//! contract starts at a [`GameStateSnapshot`] plus agent source text and
//! ends at a tagged [`ExecutionResult`].

pub mod inference;
pub mod metrics;
pub mod obs;
pub mod sandbox;
pub mod state;
pub mod telemetry;

pub use inference::{classify, recommend, score, Classification, InferenceError};

pub use sandbox::{
    validate_guess, Capability, CapabilitySet, ControllerConfig, ExecutionOutcome,
    ExecutionRequest, ExecutionResult, FailureKind, GuessRejection, SandboxController,
};

pub use state::{AnswerSet, GameStateSnapshot, GuessRecord, KeywordPool};

pub use telemetry::{ExecutionRecord, GlobalStats, ParticipantStats, TelemetrySink};

pub use metrics::METRICS;
pub use obs::init_tracing;

/// Arena core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
