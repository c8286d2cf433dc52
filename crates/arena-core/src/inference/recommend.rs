//! Deterministic guess construction from classification and scores.

use crate::state::GameStateSnapshot;

use super::classify::classify;
use super::error::{InferenceError, Result};
use super::score::score;

/// Build the best defensible guess of `answer_count` unique indices.
///
/// All proven answers come first (ascending); remaining slots are filled by
/// descending plausibility score with ties broken by ascending index, so the
/// same snapshot always yields the same guess. Proven-wrong indices are never
/// selected. If fewer than `answer_count` not-proven-wrong indices exist the
/// state is inconsistent and the error is surfaced rather than padded over.
pub fn recommend(state: &GameStateSnapshot, answer_count: usize) -> Result<Vec<usize>> {
    let classification = classify(state)?;

    if classification.definite_answers.len() > answer_count {
        return Err(InferenceError::TooManyAnswers {
            proven: classification.definite_answers.len(),
            answer_count,
        });
    }

    let available = state.pool_size() - classification.definite_wrongs.len();
    if available < answer_count {
        return Err(InferenceError::NotEnoughCandidates {
            needed: answer_count,
            available,
        });
    }

    let mut guess: Vec<usize> = classification.definite_answers.iter().copied().collect();

    let mut ranked: Vec<(usize, f64)> = score(state, &classification).into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    for (index, _) in ranked {
        if guess.len() == answer_count {
            break;
        }
        guess.push(index);
    }

    Ok(guess)
}
