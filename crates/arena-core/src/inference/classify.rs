//! Fixed-point classification of pool indices from the guess history.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::state::{GameStateSnapshot, GuessRecord};

use super::error::{InferenceError, Result};

/// Indices whose truth value has been logically proven.
///
/// Both sets only ever grow while a round progresses: a proven index is
/// frozen for the remainder of the round. The two sets are disjoint by
/// construction — overlap is reported as a contradiction, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Indices proven to be answers.
    pub definite_answers: BTreeSet<usize>,
    /// Indices proven not to be answers.
    pub definite_wrongs: BTreeSet<usize>,
}

impl Classification {
    /// Returns `true` when `index` has been proven either way.
    pub fn is_classified(&self, index: usize) -> bool {
        self.definite_answers.contains(&index) || self.definite_wrongs.contains(&index)
    }

    /// Number of proven indices.
    pub fn classified_count(&self) -> usize {
        self.definite_answers.len() + self.definite_wrongs.len()
    }
}

/// Classify every index the history proves correct or wrong.
///
/// Runs the four deduction rules to a fixed point: a full pass over the
/// history (and all history pairs) that changes nothing terminates the loop.
/// The rules are:
///
/// - **zero**: a guess with `correct_count == 0` proves all members wrong;
/// - **full**: a guess with `correct_count == len` proves all members correct;
/// - **pairwise**: two guesses differing by exactly one element on each side
///   and with unequal counts prove the swapped-in element of the higher guess
///   correct and the swapped-out element wrong;
/// - **counting closure**: once a guess's proven-correct members account for
///   its whole `correct_count`, the rest are wrong; once its proven-correct
///   plus unclassified members are exactly `correct_count`, the rest are
///   correct.
///
/// Revealed answers seed the correct set; revealed wrongs and the player's
/// own hints seed the wrong set. Any rule that would prove an index both ways
/// aborts with [`InferenceError::Contradiction`].
pub fn classify(state: &GameStateSnapshot) -> Result<Classification> {
    check_history(state)?;

    let mut answers: BTreeSet<usize> = BTreeSet::new();
    let mut wrongs: BTreeSet<usize> = BTreeSet::new();

    for &index in &state.revealed_answers {
        mark_correct(&mut answers, &wrongs, index)?;
    }
    for &index in state.revealed_wrong_answers.union(&state.my_hints) {
        mark_wrong(&mut wrongs, &answers, index)?;
    }

    loop {
        let mut changed = false;

        for guess in &state.previous_guesses {
            changed |= apply_zero_rule(guess, &mut wrongs, &answers)?;
            changed |= apply_full_rule(guess, &mut answers, &wrongs)?;
            changed |= apply_counting_closure(guess, &mut answers, &mut wrongs)?;
        }

        let guesses = &state.previous_guesses;
        for i in 0..guesses.len() {
            for j in (i + 1)..guesses.len() {
                changed |= apply_pairwise(&guesses[i], &guesses[j], &mut answers, &mut wrongs)?;
            }
        }

        if !changed {
            break;
        }
    }

    if answers.len() > state.answer_count {
        return Err(InferenceError::TooManyAnswers {
            proven: answers.len(),
            answer_count: state.answer_count,
        });
    }

    Ok(Classification {
        definite_answers: answers,
        definite_wrongs: wrongs,
    })
}

/// Reject histories that are malformed before any deduction runs.
fn check_history(state: &GameStateSnapshot) -> Result<()> {
    let pool_size = state.pool_size();

    let in_pool = |index: usize| -> Result<()> {
        if index >= pool_size {
            return Err(InferenceError::IndexOutOfBounds { index, pool_size });
        }
        Ok(())
    };

    for &index in state
        .revealed_answers
        .iter()
        .chain(&state.revealed_wrong_answers)
        .chain(&state.my_hints)
    {
        in_pool(index)?;
    }

    for guess in &state.previous_guesses {
        if guess.correct_count > guess.len() {
            return Err(InferenceError::ImpossibleCorrectCount {
                correct_count: guess.correct_count,
                guess_len: guess.len(),
            });
        }
        for &index in &guess.indices {
            in_pool(index)?;
        }
    }

    Ok(())
}

fn mark_correct(answers: &mut BTreeSet<usize>, wrongs: &BTreeSet<usize>, index: usize) -> Result<bool> {
    if wrongs.contains(&index) {
        return Err(InferenceError::Contradiction { index });
    }
    Ok(answers.insert(index))
}

fn mark_wrong(wrongs: &mut BTreeSet<usize>, answers: &BTreeSet<usize>, index: usize) -> Result<bool> {
    if answers.contains(&index) {
        return Err(InferenceError::Contradiction { index });
    }
    Ok(wrongs.insert(index))
}

fn apply_zero_rule(
    guess: &GuessRecord,
    wrongs: &mut BTreeSet<usize>,
    answers: &BTreeSet<usize>,
) -> Result<bool> {
    if guess.correct_count != 0 {
        return Ok(false);
    }
    let mut changed = false;
    for &index in &guess.indices {
        changed |= mark_wrong(wrongs, answers, index)?;
    }
    Ok(changed)
}

fn apply_full_rule(
    guess: &GuessRecord,
    answers: &mut BTreeSet<usize>,
    wrongs: &BTreeSet<usize>,
) -> Result<bool> {
    if guess.is_empty() || guess.correct_count != guess.len() {
        return Ok(false);
    }
    let mut changed = false;
    for &index in &guess.indices {
        changed |= mark_correct(answers, wrongs, index)?;
    }
    Ok(changed)
}

fn apply_counting_closure(
    guess: &GuessRecord,
    answers: &mut BTreeSet<usize>,
    wrongs: &mut BTreeSet<usize>,
) -> Result<bool> {
    let known_correct = guess
        .indices
        .iter()
        .filter(|index| answers.contains(index))
        .count();
    let unclassified: Vec<usize> = guess
        .indices
        .iter()
        .copied()
        .filter(|index| !answers.contains(index) && !wrongs.contains(index))
        .collect();

    if known_correct > guess.correct_count {
        return Err(InferenceError::ExcessKnownAnswers {
            proven: known_correct,
            correct_count: guess.correct_count,
        });
    }
    if known_correct + unclassified.len() < guess.correct_count {
        return Err(InferenceError::UnreachableCorrectCount {
            correct_count: guess.correct_count,
            achievable: known_correct + unclassified.len(),
        });
    }

    let mut changed = false;
    if known_correct == guess.correct_count {
        for index in unclassified {
            changed |= mark_wrong(wrongs, answers, index)?;
        }
    } else if known_correct + unclassified.len() == guess.correct_count {
        for index in unclassified {
            changed |= mark_correct(answers, wrongs, index)?;
        }
    }
    Ok(changed)
}

fn apply_pairwise(
    a: &GuessRecord,
    b: &GuessRecord,
    answers: &mut BTreeSet<usize>,
    wrongs: &mut BTreeSet<usize>,
) -> Result<bool> {
    let only_a: Vec<usize> = a.indices.iter().copied().filter(|i| !b.contains(*i)).collect();
    let only_b: Vec<usize> = b.indices.iter().copied().filter(|i| !a.contains(*i)).collect();

    // The rule only fires on a symmetric difference of exactly one per side.
    if only_a.len() != 1 || only_b.len() != 1 {
        return Ok(false);
    }

    let mut changed = false;
    if a.correct_count > b.correct_count {
        changed |= mark_correct(answers, wrongs, only_a[0])?;
        changed |= mark_wrong(wrongs, answers, only_b[0])?;
    } else if b.correct_count > a.correct_count {
        changed |= mark_correct(answers, wrongs, only_b[0])?;
        changed |= mark_wrong(wrongs, answers, only_a[0])?;
    }
    Ok(changed)
}
