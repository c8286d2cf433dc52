//! End-to-end properties of the constraint inference engine.

use arena_core::{
    classify, recommend, score, AnswerSet, GameStateSnapshot, GuessRecord, InferenceError,
    KeywordPool,
};

fn pool(n: usize) -> KeywordPool {
    (0..n).map(|i| format!("kw{i}")).collect()
}

/// Build a history entry consistent with a hidden answer set.
fn consistent_guess(answers: &AnswerSet, player: &str, indices: Vec<usize>) -> GuessRecord {
    let correct = answers.correct_count_for(&indices);
    GuessRecord::new(player, indices, correct)
}

// ── zero / full rules ───────────────────────────────────────────────────

#[test]
fn zero_correct_guess_classifies_every_member_wrong() {
    let answers = AnswerSet::new([4, 5]);
    let state = GameStateSnapshot::new(pool(6), 2)
        .with_guess(consistent_guess(&answers, "a", vec![0, 1]))
        .with_guess(consistent_guess(&answers, "b", vec![2, 3]));

    let c = classify(&state).unwrap();
    for index in [0, 1, 2, 3] {
        assert!(c.definite_wrongs.contains(&index), "index {index} not wrong");
    }
}

#[test]
fn full_correct_guess_classifies_every_member_correct() {
    let answers = AnswerSet::new([1, 3]);
    let state = GameStateSnapshot::new(pool(6), 2)
        .with_guess(consistent_guess(&answers, "a", vec![1, 3]));

    let c = classify(&state).unwrap();
    assert!(c.definite_answers.contains(&1));
    assert!(c.definite_answers.contains(&3));
}

// ── pairwise rule ───────────────────────────────────────────────────────

#[test]
fn pairwise_single_swap_proves_both_elements() {
    // Pool size 6, answer_count = 2. Guess A = {0,1}, correct = 1.
    // Guess B = {0,2}, correct = 2. B's count exceeds A's, so index 2 is
    // correct and index 1 is wrong.
    let state = GameStateSnapshot::new(pool(6), 2)
        .with_guess(GuessRecord::new("a", vec![0, 1], 1))
        .with_guess(GuessRecord::new("b", vec![0, 2], 2));

    let c = classify(&state).unwrap();
    assert!(c.definite_answers.contains(&2));
    assert!(c.definite_wrongs.contains(&1));
}

// ── monotonicity ────────────────────────────────────────────────────────

#[test]
fn classifications_never_flip_as_history_grows() {
    let answers = AnswerSet::new([2, 5]);
    let mut state = GameStateSnapshot::new(pool(7), 2).with_hints([6]);

    let turns = [
        vec![0, 1],
        vec![2, 3],
        vec![2, 5],
        vec![3, 4],
        vec![1, 5],
    ];

    let mut previous = classify(&state).unwrap();
    for (turn, indices) in turns.into_iter().enumerate() {
        state = state.with_guess(consistent_guess(&answers, &format!("p{turn}"), indices));
        let next = classify(&state).unwrap();
        assert!(
            previous.definite_answers.is_subset(&next.definite_answers),
            "answers shrank at turn {turn}"
        );
        assert!(
            previous.definite_wrongs.is_subset(&next.definite_wrongs),
            "wrongs shrank at turn {turn}"
        );
        previous = next;
    }

    // With this history everything proven is consistent with the real
    // answer set.
    for index in &previous.definite_answers {
        assert!(answers.contains(*index));
    }
    for index in &previous.definite_wrongs {
        assert!(!answers.contains(*index));
    }
}

// ── recommend ───────────────────────────────────────────────────────────

#[test]
fn recommend_returns_answer_count_unique_valid_indices() {
    let state = GameStateSnapshot::new(pool(10), 3)
        .with_hints([9])
        .with_guess(GuessRecord::new("a", vec![0, 1, 2], 1))
        .with_guess(GuessRecord::new("b", vec![3, 4, 5], 2));

    let guess = recommend(&state, 3).unwrap();
    assert_eq!(guess.len(), 3);

    let mut unique = guess.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), 3);

    for index in &guess {
        assert!(*index < 10);
    }
}

#[test]
fn recommend_never_returns_definite_wrongs() {
    let state = GameStateSnapshot::new(pool(8), 2)
        .with_hints([7])
        .with_guess(GuessRecord::new("a", vec![0, 1], 0));

    let c = classify(&state).unwrap();
    let guess = recommend(&state, 2).unwrap();
    for index in &guess {
        assert!(
            !c.definite_wrongs.contains(index),
            "recommended proven-wrong index {index}"
        );
    }
}

#[test]
fn recommend_reports_inconsistency_instead_of_padding() {
    // Every non-hint index is proven wrong; there is nothing left to guess.
    let state = GameStateSnapshot::new(pool(4), 2)
        .with_hints([3])
        .with_guess(GuessRecord::new("a", vec![0, 1], 0))
        .with_guess(GuessRecord::new("b", vec![2, 0], 0));

    match recommend(&state, 2) {
        Err(InferenceError::NotEnoughCandidates { needed: 2, .. }) => {}
        other => panic!("expected NotEnoughCandidates, got {other:?}"),
    }
}

// ── determinism ─────────────────────────────────────────────────────────

#[test]
fn identical_snapshots_produce_identical_results() {
    let state = GameStateSnapshot::new(pool(12), 4)
        .with_hints([11])
        .with_revealed_answers([0])
        .with_guess(GuessRecord::new("a", vec![0, 1, 2, 3], 2))
        .with_guess(GuessRecord::new("b", vec![2, 3, 4, 5], 1))
        .with_guess(GuessRecord::new("c", vec![6, 7, 8, 9], 0));

    let c1 = classify(&state).unwrap();
    let c2 = classify(&state).unwrap();
    assert_eq!(c1, c2);

    assert_eq!(score(&state, &c1), score(&state, &c2));
    assert_eq!(recommend(&state, 4).unwrap(), recommend(&state, 4).unwrap());
}

#[test]
fn contradictory_snapshot_aborts_loudly() {
    let state = GameStateSnapshot::new(pool(5), 2)
        .with_revealed_answers([0])
        .with_revealed_wrongs([0]);

    match classify(&state) {
        Err(InferenceError::Contradiction { index: 0 }) => {}
        other => panic!("expected Contradiction, got {other:?}"),
    }
}
