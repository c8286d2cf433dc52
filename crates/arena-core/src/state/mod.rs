//! Game state model: the immutable per-turn view of a round.
//!
//! A round is played against a fixed [`KeywordPool`]; the hidden solution is
//! an [`AnswerSet`] held by the orchestrator and never exposed to agents.
//! Each turn the orchestrator assembles a [`GameStateSnapshot`] — everything
//! a single player is allowed to know — and passes it into a sandboxed
//! execution. Snapshots are plain serde values: they cross the orchestrator
//! boundary as JSON and are copied, never shared, into the sandbox.

pub mod pool;
pub mod snapshot;

pub use pool::{AnswerSet, KeywordPool};
pub use snapshot::{GameStateSnapshot, GuessRecord};
