//! Sample agents, written in the agent language.
//!
//! Shipped for three reasons: documentation of the language surface, test
//! fodder for the full execution path, and orchestrator fallbacks (a player
//! with no code of their own can be given one of these).

/// Picks revealed answers first, then fills the guess with uniform random
/// choices among indices not known to be wrong. Needs `collections`,
/// `random`, and `math`.
pub const RANDOM_PICKER: &str = "\
// Pick revealed answers first, then fill with random open indices.
fn make_guess(state) {
    let picked = [];
    for idx in state.revealed_answers {
        if len(picked) < state.answer_count {
            picked = push(picked, idx);
        }
    }
    let open = [];
    for idx in range(len(state.keywords)) {
        let blocked = contains(state.my_hints, idx)
            || contains(state.revealed_wrong_answers, idx)
            || contains(picked, idx);
        if !blocked {
            open = push(open, idx);
        }
    }
    while len(picked) < state.answer_count && len(open) > 0 {
        let slot = floor(random() * len(open));
        picked = push(picked, open[slot]);
        let rest = [];
        for idx in open {
            if idx != open[slot] {
                rest = push(rest, idx);
            }
        }
        open = rest;
    }
    return picked;
}
";

/// Scores every keyword by the hit rate of the guesses it appeared in and
/// plays the top scorers. Needs `collections`.
pub const FREQUENCY_SCORER: &str = "\
// Score keywords by how often they appeared in partially-correct guesses.
fn make_guess(state) {
    let total = len(state.keywords);
    let scores = [];
    for idx in range(total) {
        scores = push(scores, 0.0);
    }
    for entry in state.previous_guesses {
        if entry.correct_count > 0 {
            let points = entry.correct_count / len(entry.guess);
            for idx in entry.guess {
                scores[idx] = scores[idx] + points;
            }
        } else {
            for idx in entry.guess {
                scores[idx] = scores[idx] - 1000.0;
            }
        }
    }
    let picked = [];
    for idx in state.revealed_answers {
        if len(picked) < state.answer_count {
            picked = push(picked, idx);
        }
    }
    while len(picked) < state.answer_count {
        let best = -1;
        let best_score = -1000000.0;
        for idx in range(total) {
            let blocked = contains(picked, idx)
                || contains(state.my_hints, idx)
                || contains(state.revealed_wrong_answers, idx);
            if !blocked && scores[idx] > best_score {
                best = idx;
                best_score = scores[idx];
            }
        }
        if best < 0 {
            return picked;
        }
        picked = push(picked, best);
    }
    return picked;
}
";

/// Defers to the constraint inference engine. Needs `inference` and `log`
/// (and `collections` for the log line).
pub const DEDUCTIVE: &str = "\
// Lean on the engine: proven answers first, then the engine's ranking.
fn make_guess(state) {
    let facts = classify(state);
    log(len(facts.definite_answers));
    return recommend(state);
}
";
