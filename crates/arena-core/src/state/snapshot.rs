//! Per-turn snapshot types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::pool::KeywordPool;

/// One entry of the public guess history.
///
/// Immutable once appended: the indices a player submitted (ordered, no
/// duplicates, `indices.len()` equals the round's answer count) together with
/// the revealed number of correct members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessRecord {
    /// Orchestrator-assigned id of the player who submitted the guess.
    pub player_id: String,
    /// The guessed indices, in submission order.
    pub indices: Vec<usize>,
    /// How many of `indices` belong to the hidden answer set.
    pub correct_count: usize,
}

impl GuessRecord {
    pub fn new(player_id: impl Into<String>, indices: Vec<usize>, correct_count: usize) -> Self {
        Self {
            player_id: player_id.into(),
            indices,
            correct_count,
        }
    }

    /// Number of guessed indices.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` for the (never valid) empty guess.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns `true` when the guess includes `index`.
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }
}

/// Read-only aggregate of everything one player may know at one turn.
///
/// Built by the orchestrator, consumed by the inference engine and by
/// sandboxed executions. The sandbox receives a converted *copy*; nothing an
/// agent does to its copy reaches this value. `revealed_answers` and
/// `revealed_wrong_answers` only ever grow over a round — classifications are
/// frozen once derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    /// The round's fixed keyword pool.
    pub keyword_pool: KeywordPool,
    /// Size of the hidden answer set; also the required guess length.
    pub answer_count: usize,
    /// 1-based turn counter.
    pub current_turn: u32,
    /// The receiving player's private hints: indices known a priori to be wrong.
    pub my_hints: BTreeSet<usize>,
    /// Indices publicly proven correct.
    pub revealed_answers: BTreeSet<usize>,
    /// Indices publicly proven wrong.
    pub revealed_wrong_answers: BTreeSet<usize>,
    /// Full public guess history, oldest first.
    pub previous_guesses: Vec<GuessRecord>,
}

impl GameStateSnapshot {
    /// A fresh first-turn snapshot with no history and no revelations.
    pub fn new(keyword_pool: KeywordPool, answer_count: usize) -> Self {
        Self {
            keyword_pool,
            answer_count,
            current_turn: 1,
            my_hints: BTreeSet::new(),
            revealed_answers: BTreeSet::new(),
            revealed_wrong_answers: BTreeSet::new(),
            previous_guesses: Vec::new(),
        }
    }

    pub fn with_turn(mut self, turn: u32) -> Self {
        self.current_turn = turn;
        self
    }

    pub fn with_hints(mut self, hints: impl IntoIterator<Item = usize>) -> Self {
        self.my_hints = hints.into_iter().collect();
        self
    }

    pub fn with_revealed_answers(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.revealed_answers = indices.into_iter().collect();
        self
    }

    pub fn with_revealed_wrongs(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.revealed_wrong_answers = indices.into_iter().collect();
        self
    }

    /// Append one guess to the history (builder form, used heavily in tests).
    pub fn with_guess(mut self, guess: GuessRecord) -> Self {
        self.previous_guesses.push(guess);
        self
    }

    /// Number of pool indices.
    pub fn pool_size(&self) -> usize {
        self.keyword_pool.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> KeywordPool {
        ["ant", "bee", "cat", "dog"].into_iter().collect()
    }

    #[test]
    fn test_builder_chain() {
        let snapshot = GameStateSnapshot::new(pool(), 2)
            .with_turn(3)
            .with_hints([0])
            .with_revealed_answers([1])
            .with_guess(GuessRecord::new("p1", vec![1, 2], 1));

        assert_eq!(snapshot.current_turn, 3);
        assert!(snapshot.my_hints.contains(&0));
        assert!(snapshot.revealed_answers.contains(&1));
        assert_eq!(snapshot.previous_guesses.len(), 1);
        assert_eq!(snapshot.pool_size(), 4);
    }

    #[test]
    fn test_snapshot_serde_roundtrip() {
        let snapshot = GameStateSnapshot::new(pool(), 2)
            .with_hints([3])
            .with_guess(GuessRecord::new("p2", vec![0, 1], 0));
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GameStateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }
}
