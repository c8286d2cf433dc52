//! Constraint inference engine: deduce hidden facts from the guess history.
//!
//! Pure functions over a [`GameStateSnapshot`](crate::state::GameStateSnapshot);
//! no side effects, identical inputs always yield identical outputs. Ordered
//! collections are used throughout so iteration order — and therefore every
//! result — is reproducible.
//!
//! # Modules
//!
//! - [`classify`]  — fixed-point closure of the four deduction rules
//! - [`score`]     — 0–100 plausibility scores for unclassified indices
//! - [`recommend`] — deterministic guess construction from the above
//! - [`error`]     — [`InferenceError`], the state-inconsistency taxonomy
//!
//! A logically impossible history (an index proven both correct and wrong, a
//! correct count a guess cannot reach, …) is a fatal orchestrator-side bug:
//! every function here reports it as [`InferenceError`] instead of guessing
//! around it.

pub mod classify;
pub mod error;
pub mod recommend;
pub mod score;

pub use classify::{classify, Classification};
pub use error::InferenceError;
pub use recommend::recommend;
pub use score::score;
