//! Acceptance rules for a candidate guess.
//!
//! The five rules run in order and short-circuit on the first failure, each
//! with its own [`GuessRejection`] reason, so the orchestrator can tell a
//! malformed value from a rule-breaking one.

use crate::state::GameStateSnapshot;

use super::script::Value;

/// Why a candidate guess was rejected. One variant per validation rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuessRejection {
    /// Rule 1: the returned value is not a sequence at all.
    #[error("guess must be a list of indices, got {found}")]
    NotASequence { found: String },

    /// Rule 2: wrong number of indices.
    #[error("guess must contain exactly {expected} indices, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// Rule 3: an element is not an integer inside the pool.
    #[error("guess element at position {position} ({found}) is not a valid index into a pool of {pool_size}")]
    IndexOutOfRange {
        position: usize,
        found: String,
        pool_size: usize,
    },

    /// Rule 4: the same index appears twice.
    #[error("guess contains index {index} more than once")]
    DuplicateIndex { index: usize },

    /// Rule 5: the submitting player guessed one of their own hints.
    #[error("guess contains index {index}, one of the submitting player's own hints")]
    OwnHint { index: usize },
}

impl GuessRejection {
    /// The 1-based number of the violated rule.
    pub fn rule(&self) -> u8 {
        match self {
            GuessRejection::NotASequence { .. } => 1,
            GuessRejection::WrongLength { .. } => 2,
            GuessRejection::IndexOutOfRange { .. } => 3,
            GuessRejection::DuplicateIndex { .. } => 4,
            GuessRejection::OwnHint { .. } => 5,
        }
    }
}

/// Validate the raw value an agent returned against the snapshot it was
/// computed for. On success the extracted indices become the authoritative
/// guess.
pub fn validate_guess(
    candidate: &Value,
    state: &GameStateSnapshot,
) -> Result<Vec<usize>, GuessRejection> {
    // Rule 1: must be a sequence.
    let items = match candidate {
        Value::List(items) => items,
        other => {
            return Err(GuessRejection::NotASequence {
                found: other.type_name().to_string(),
            })
        }
    };

    // Rule 2: exact length.
    if items.len() != state.answer_count {
        return Err(GuessRejection::WrongLength {
            expected: state.answer_count,
            actual: items.len(),
        });
    }

    // Rule 3: every element an in-pool integer index.
    let pool_size = state.pool_size();
    let mut guess = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        match item {
            Value::Int(v) if *v >= 0 && (*v as usize) < pool_size => guess.push(*v as usize),
            other => {
                return Err(GuessRejection::IndexOutOfRange {
                    position,
                    found: other.to_string(),
                    pool_size,
                })
            }
        }
    }

    // Rule 4: no duplicates.
    for (i, index) in guess.iter().enumerate() {
        if guess[..i].contains(index) {
            return Err(GuessRejection::DuplicateIndex { index: *index });
        }
    }

    // Rule 5: none of the player's own hints.
    for index in &guess {
        if state.my_hints.contains(index) {
            return Err(GuessRejection::OwnHint { index: *index });
        }
    }

    Ok(guess)
}
