//! Error types for the inference engine.

/// A logically impossible game state.
///
/// Every variant is a flavour of the same fatal condition: the snapshot the
/// orchestrator handed us cannot describe any real round. Callers must treat
/// this as a data/orchestrator bug and abort the turn — never substitute a
/// fallback guess.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("state inconsistency: index {index} is proven both correct and wrong")]
    Contradiction { index: usize },

    #[error(
        "state inconsistency: guess of {guess_len} indices cannot have {correct_count} correct"
    )]
    ImpossibleCorrectCount {
        correct_count: usize,
        guess_len: usize,
    },

    #[error(
        "state inconsistency: guess contains {proven} proven answers but claims only {correct_count} correct"
    )]
    ExcessKnownAnswers {
        proven: usize,
        correct_count: usize,
    },

    #[error(
        "state inconsistency: guess can have at most {achievable} correct but claims {correct_count}"
    )]
    UnreachableCorrectCount {
        correct_count: usize,
        achievable: usize,
    },

    #[error("state inconsistency: guess references index {index} outside pool of {pool_size}")]
    IndexOutOfBounds { index: usize, pool_size: usize },

    #[error("state inconsistency: {proven} indices proven correct but the round has {answer_count} answers")]
    TooManyAnswers { proven: usize, answer_count: usize },

    #[error("state inconsistency: need {needed} candidates but only {available} indices are not proven wrong")]
    NotEnoughCandidates { needed: usize, available: usize },
}

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
