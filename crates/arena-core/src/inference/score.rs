//! Plausibility scores for indices the rules could not pin down.

use std::collections::BTreeMap;

use crate::state::GameStateSnapshot;

use super::classify::Classification;

/// Neutral score for an index no guess has ever touched.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Score every unclassified index on a 0–100 scale.
///
/// For each guess containing the index, the guess contributes the ratio of
/// its still-unaccounted-for correct answers to its unclassified members
/// (`remaining_correct / unknown_in_guess`); the index's score is the mean
/// contribution scaled to 0–100. An index appearing in no guess scores
/// [`NEUTRAL_SCORE`] — maximum uncertainty.
///
/// Classified indices are omitted: their truth value is already proven, so a
/// plausibility score would be meaningless.
pub fn score(state: &GameStateSnapshot, classification: &Classification) -> BTreeMap<usize, f64> {
    let mut scores = BTreeMap::new();

    for index in 0..state.pool_size() {
        if classification.is_classified(index) {
            continue;
        }

        let mut sum = 0.0;
        let mut appearances = 0usize;
        for guess in &state.previous_guesses {
            if !guess.contains(index) {
                continue;
            }
            let known_correct = guess
                .indices
                .iter()
                .filter(|i| classification.definite_answers.contains(i))
                .count();
            let unknown = guess
                .indices
                .iter()
                .filter(|i| !classification.is_classified(**i))
                .count();
            // `index` itself is unclassified and a member, so unknown >= 1.
            let remaining = guess.correct_count.saturating_sub(known_correct);
            sum += remaining as f64 / unknown as f64;
            appearances += 1;
        }

        let value = if appearances == 0 {
            NEUTRAL_SCORE
        } else {
            100.0 * sum / appearances as f64
        };
        scores.insert(index, value);
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::classify::classify;
    use crate::state::{GuessRecord, KeywordPool};

    fn pool(n: usize) -> KeywordPool {
        (0..n).map(|i| format!("kw{i}")).collect()
    }

    #[test]
    fn test_untouched_index_scores_neutral() {
        let state = GameStateSnapshot::new(pool(4), 2);
        let c = classify(&state).unwrap();
        let scores = score(&state, &c);
        assert_eq!(scores.get(&0), Some(&NEUTRAL_SCORE));
        assert_eq!(scores.len(), 4);
    }

    #[test]
    fn test_single_guess_ratio() {
        // {0,1} with 1 correct and nothing classified: both members score
        // 100 * 1/2.
        let state =
            GameStateSnapshot::new(pool(4), 2).with_guess(GuessRecord::new("p", vec![0, 1], 1));
        let c = classify(&state).unwrap();
        let scores = score(&state, &c);
        assert_eq!(scores.get(&0), Some(&50.0));
        assert_eq!(scores.get(&1), Some(&50.0));
        assert_eq!(scores.get(&2), Some(&NEUTRAL_SCORE));
    }

    #[test]
    fn test_known_correct_members_lower_remaining() {
        // 0 is revealed correct. {0,1,2} with 1 correct leaves nothing for 1
        // and 2... which counting closure proves wrong. Use 2 correct so one
        // answer remains split between two unknowns: ratio 1/2.
        let state = GameStateSnapshot::new(pool(5), 3)
            .with_revealed_answers([0])
            .with_guess(GuessRecord::new("p", vec![0, 1, 2], 2));
        let c = classify(&state).unwrap();
        let scores = score(&state, &c);
        assert_eq!(scores.get(&1), Some(&50.0));
        assert_eq!(scores.get(&2), Some(&50.0));
        // 0 is classified, so it carries no score.
        assert!(!scores.contains_key(&0));
    }

    #[test]
    fn test_scores_average_across_guesses() {
        // Index 1 appears in a 1-of-2 guess (ratio 0.5) and a 2-of-2...
        // a full guess would classify it, so use 1-of-2 and 1-of-3:
        // mean of 0.5 and 1/3.
        let state = GameStateSnapshot::new(pool(6), 2)
            .with_guess(GuessRecord::new("p", vec![1, 2], 1))
            .with_guess(GuessRecord::new("q", vec![1, 3, 4], 1));
        let c = classify(&state).unwrap();
        let scores = score(&state, &c);
        let expected = 100.0 * (0.5 + 1.0 / 3.0) / 2.0;
        let got = scores.get(&1).copied().unwrap();
        assert!((got - expected).abs() < 1e-9, "got {got}, expected {expected}");
    }

    #[test]
    fn test_score_is_deterministic() {
        let state = GameStateSnapshot::new(pool(6), 2)
            .with_guess(GuessRecord::new("p", vec![0, 1], 1))
            .with_guess(GuessRecord::new("q", vec![2, 3], 1));
        let c = classify(&state).unwrap();
        assert_eq!(score(&state, &c), score(&state, &c));
    }
}
