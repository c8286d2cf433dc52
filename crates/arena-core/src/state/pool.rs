//! Keyword pool and hidden answer set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The ordered, fixed list of candidate terms for a round.
///
/// Terms are addressed everywhere else by their index `0..len()`; the pool
/// itself never changes for the lifetime of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordPool(Vec<String>);

impl KeywordPool {
    /// Create a pool from the round's terms, in presentation order.
    pub fn new(terms: Vec<String>) -> Self {
        Self(terms)
    }

    /// Number of terms in the pool.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the pool holds no terms.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The term at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Returns `true` when `index` addresses a term in this pool.
    pub fn contains_index(&self, index: usize) -> bool {
        index < self.0.len()
    }

    /// All terms, in pool order.
    pub fn terms(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for KeywordPool {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The hidden solution for a round: the indices the players are hunting.
///
/// Owned by the orchestrator. Never part of a [`super::GameStateSnapshot`]
/// and never visible to sandboxed code; its only job on this side of the
/// boundary is scoring a candidate guess when the orchestrator (or a test)
/// builds a consistent history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeSet<usize>);

impl AnswerSet {
    /// Build the answer set from the round's solution indices.
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(indices.into_iter().collect())
    }

    /// Number of answers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` when `index` is one of the round's answers.
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    /// How many elements of `guess` are answers.
    pub fn correct_count_for(&self, guess: &[usize]) -> usize {
        guess.iter().filter(|idx| self.0.contains(idx)).count()
    }

    /// The answer indices, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_indexing() {
        let pool: KeywordPool = ["lion", "tiger", "piano"].into_iter().collect();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.get(1), Some("tiger"));
        assert_eq!(pool.get(3), None);
        assert!(pool.contains_index(2));
        assert!(!pool.contains_index(3));
    }

    #[test]
    fn test_answer_set_scores_guesses() {
        let answers = AnswerSet::new([1, 4]);
        assert_eq!(answers.correct_count_for(&[0, 1]), 1);
        assert_eq!(answers.correct_count_for(&[1, 4]), 2);
        assert_eq!(answers.correct_count_for(&[0, 2]), 0);
        assert!(answers.contains(4));
        assert!(!answers.contains(0));
    }

    #[test]
    fn test_pool_serde_is_transparent() {
        let pool: KeywordPool = ["a", "b"].into_iter().collect();
        let json = serde_json::to_string(&pool).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let back: KeywordPool = serde_json::from_str(&json).unwrap();
        assert_eq!(pool, back);
    }
}
