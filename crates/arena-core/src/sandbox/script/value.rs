//! Runtime values and snapshot conversion.

use std::collections::BTreeMap;
use std::fmt;

use crate::state::GameStateSnapshot;

/// A value inside the agent sandbox.
///
/// Records are read-only composites (agents cannot construct or mutate them);
/// everything else behaves by value — any access yields a copy, so nothing an
/// agent holds aliases host state.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Record(BTreeMap<String, Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Structural equality with numeric promotion: `1 == 1.0`.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                *a as f64 == *b
            }
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Record(a), Value::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.loose_eq(vb))
            }
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Record(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Convert a snapshot into the record the agent's `make_guess` receives.
///
/// Field layout seen by agents:
///
/// ```text
/// {
///   keywords: [string],
///   answer_count: int,
///   current_turn: int,
///   my_hints: [int],
///   revealed_answers: [int],
///   revealed_wrong_answers: [int],
///   previous_guesses: [{ player_id: string, guess: [int], correct_count: int }],
/// }
/// ```
///
/// The conversion copies everything; the agent's record never aliases the
/// authoritative snapshot.
pub fn snapshot_value(state: &GameStateSnapshot) -> Value {
    let index_list = |indices: &mut dyn Iterator<Item = usize>| {
        Value::List(indices.map(|i| Value::Int(i as i64)).collect())
    };

    let mut fields = BTreeMap::new();
    fields.insert(
        "keywords".to_string(),
        Value::List(
            state
                .keyword_pool
                .terms()
                .iter()
                .map(|t| Value::Str(t.clone()))
                .collect(),
        ),
    );
    fields.insert(
        "answer_count".to_string(),
        Value::Int(state.answer_count as i64),
    );
    fields.insert(
        "current_turn".to_string(),
        Value::Int(i64::from(state.current_turn)),
    );
    fields.insert(
        "my_hints".to_string(),
        index_list(&mut state.my_hints.iter().copied()),
    );
    fields.insert(
        "revealed_answers".to_string(),
        index_list(&mut state.revealed_answers.iter().copied()),
    );
    fields.insert(
        "revealed_wrong_answers".to_string(),
        index_list(&mut state.revealed_wrong_answers.iter().copied()),
    );
    fields.insert(
        "previous_guesses".to_string(),
        Value::List(
            state
                .previous_guesses
                .iter()
                .map(|record| {
                    let mut entry = BTreeMap::new();
                    entry.insert(
                        "player_id".to_string(),
                        Value::Str(record.player_id.clone()),
                    );
                    entry.insert(
                        "guess".to_string(),
                        index_list(&mut record.indices.iter().copied()),
                    );
                    entry.insert(
                        "correct_count".to_string(),
                        Value::Int(record.correct_count as i64),
                    );
                    Value::Record(entry)
                })
                .collect(),
        ),
    );
    Value::Record(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{GuessRecord, KeywordPool};

    #[test]
    fn test_loose_eq_promotes_numbers() {
        assert!(Value::Int(1).loose_eq(&Value::Float(1.0)));
        assert!(!Value::Int(1).loose_eq(&Value::Float(1.5)));
        assert!(Value::List(vec![Value::Int(2)]).loose_eq(&Value::List(vec![Value::Float(2.0)])));
        assert!(!Value::Str("1".into()).loose_eq(&Value::Int(1)));
    }

    #[test]
    fn test_display_renders_compound_values() {
        let v = Value::List(vec![Value::Int(1), Value::Str("a".into()), Value::Bool(true)]);
        assert_eq!(v.to_string(), "[1, a, true]");
    }

    #[test]
    fn test_snapshot_conversion_shape() {
        let pool: KeywordPool = ["x", "y", "z"].into_iter().collect();
        let state = GameStateSnapshot::new(pool, 1)
            .with_hints([2])
            .with_guess(GuessRecord::new("p7", vec![0, 1], 1));
        let Value::Record(fields) = snapshot_value(&state) else {
            panic!("expected record");
        };
        assert_eq!(fields["answer_count"], Value::Int(1));
        assert_eq!(
            fields["my_hints"],
            Value::List(vec![Value::Int(2)])
        );
        let Value::List(guesses) = &fields["previous_guesses"] else {
            panic!("expected list");
        };
        let Value::Record(entry) = &guesses[0] else {
            panic!("expected record entry");
        };
        assert_eq!(entry["correct_count"], Value::Int(1));
        assert_eq!(
            entry["guess"],
            Value::List(vec![Value::Int(0), Value::Int(1)])
        );
    }
}
