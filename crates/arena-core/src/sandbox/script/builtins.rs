//! The builtin surface reachable from agent code.
//!
//! Every builtin belongs to a [`Capability`] group and is dispatched only
//! when that capability was granted — the registry below is the entire
//! surface area of the sandbox. No entry touches the host: no clock, no I/O,
//! no allocation beyond plain values.

use rand::Rng;

use crate::inference;
use crate::sandbox::capability::Capability;

use super::error::EvalError;
use super::interp::Interp;
use super::value::Value;

/// Handler signature: builtins may read interpreter state (snapshot, logs).
pub type BuiltinFn = for<'a, 'b> fn(&'a mut Interp<'b>, Vec<Value>) -> Result<Value, EvalError>;

pub struct Builtin {
    pub name: &'static str,
    pub capability: Capability,
    pub run: BuiltinFn,
}

/// Find a builtin by name. `None` means the name does not exist at all
/// (as opposed to existing but not being granted).
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    REGISTRY.iter().find(|b| b.name == name)
}

static REGISTRY: &[Builtin] = &[
    // math
    Builtin { name: "abs", capability: Capability::Math, run: math_abs },
    Builtin { name: "min", capability: Capability::Math, run: math_min },
    Builtin { name: "max", capability: Capability::Math, run: math_max },
    Builtin { name: "floor", capability: Capability::Math, run: math_floor },
    Builtin { name: "ceil", capability: Capability::Math, run: math_ceil },
    Builtin { name: "round", capability: Capability::Math, run: math_round },
    Builtin { name: "sqrt", capability: Capability::Math, run: math_sqrt },
    Builtin { name: "pow", capability: Capability::Math, run: math_pow },
    // collections
    Builtin { name: "len", capability: Capability::Collections, run: coll_len },
    Builtin { name: "push", capability: Capability::Collections, run: coll_push },
    Builtin { name: "contains", capability: Capability::Collections, run: coll_contains },
    Builtin { name: "sort", capability: Capability::Collections, run: coll_sort },
    Builtin { name: "range", capability: Capability::Collections, run: coll_range },
    Builtin { name: "keys", capability: Capability::Collections, run: coll_keys },
    // random
    Builtin { name: "random", capability: Capability::Random, run: random_float },
    // inference
    Builtin { name: "classify", capability: Capability::Inference, run: inf_classify },
    Builtin { name: "scores", capability: Capability::Inference, run: inf_scores },
    Builtin { name: "recommend", capability: Capability::Inference, run: inf_recommend },
    // log
    Builtin { name: "log", capability: Capability::Log, run: log_line },
];

/// Largest list `range` will materialize.
const MAX_RANGE_LEN: i64 = 1_000_000;

fn expect_arity(name: &str, args: &[Value], arity: usize) -> Result<(), EvalError> {
    if args.len() != arity {
        return Err(EvalError::fault(format!(
            "`{name}` expects {arity} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn numeric(name: &str, value: &Value) -> Result<f64, EvalError> {
    match value {
        Value::Int(v) => Ok(*v as f64),
        Value::Float(v) => Ok(*v),
        other => Err(EvalError::fault(format!(
            "`{name}` needs a number, got {}",
            other.type_name()
        ))),
    }
}

/// Convert a float with integral meaning back to an `int` value, guarding
/// against non-finite and unrepresentable results.
fn integral(name: &str, value: f64) -> Result<Value, EvalError> {
    if !value.is_finite() || value < i64::MIN as f64 || value > i64::MAX as f64 {
        return Err(EvalError::fault(format!(
            "`{name}` result {value} is not representable as an integer"
        )));
    }
    Ok(Value::Int(value as i64))
}

// ── math ─────────────────────────────────────────────────────────────────

fn math_abs(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("abs", &args, 1)?;
    match &args[0] {
        Value::Int(v) => v
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| EvalError::fault("integer overflow")),
        Value::Float(v) => Ok(Value::Float(v.abs())),
        other => Err(EvalError::fault(format!(
            "`abs` needs a number, got {}",
            other.type_name()
        ))),
    }
}

fn binary_numeric(
    name: &str,
    args: &[Value],
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    expect_arity(name, args, 2)?;
    match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(*a, *b))),
        (a, b) => Ok(Value::Float(float_op(numeric(name, a)?, numeric(name, b)?))),
    }
}

fn math_min(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    binary_numeric("min", &args, i64::min, f64::min)
}

fn math_max(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    binary_numeric("max", &args, i64::max, f64::max)
}

fn math_floor(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("floor", &args, 1)?;
    match &args[0] {
        Value::Int(v) => Ok(Value::Int(*v)),
        other => integral("floor", numeric("floor", other)?.floor()),
    }
}

fn math_ceil(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("ceil", &args, 1)?;
    match &args[0] {
        Value::Int(v) => Ok(Value::Int(*v)),
        other => integral("ceil", numeric("ceil", other)?.ceil()),
    }
}

fn math_round(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("round", &args, 1)?;
    match &args[0] {
        Value::Int(v) => Ok(Value::Int(*v)),
        other => integral("round", numeric("round", other)?.round()),
    }
}

fn math_sqrt(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("sqrt", &args, 1)?;
    let v = numeric("sqrt", &args[0])?;
    if v < 0.0 {
        return Err(EvalError::fault("`sqrt` of a negative number"));
    }
    Ok(Value::Float(v.sqrt()))
}

fn math_pow(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("pow", &args, 2)?;
    let base = numeric("pow", &args[0])?;
    let exp = numeric("pow", &args[1])?;
    Ok(Value::Float(base.powf(exp)))
}

// ── collections ──────────────────────────────────────────────────────────

fn coll_len(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("len", &args, 1)?;
    let len = match &args[0] {
        Value::List(items) => items.len(),
        Value::Str(s) => s.chars().count(),
        Value::Record(fields) => fields.len(),
        other => {
            return Err(EvalError::fault(format!(
                "`len` needs a list, string, or record, got {}",
                other.type_name()
            )))
        }
    };
    Ok(Value::Int(len as i64))
}

fn coll_push(_: &mut Interp<'_>, mut args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("push", &args, 2)?;
    let value = args.pop().unwrap_or(Value::Unit);
    match args.pop() {
        Some(Value::List(mut items)) => {
            items.push(value);
            Ok(Value::List(items))
        }
        Some(other) => Err(EvalError::fault(format!(
            "`push` needs a list, got {}",
            other.type_name()
        ))),
        None => Err(EvalError::fault("`push` expects 2 argument(s), got 0")),
    }
}

fn coll_contains(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("contains", &args, 2)?;
    match &args[0] {
        Value::List(items) => Ok(Value::Bool(items.iter().any(|v| v.loose_eq(&args[1])))),
        other => Err(EvalError::fault(format!(
            "`contains` needs a list, got {}",
            other.type_name()
        ))),
    }
}

fn coll_sort(_: &mut Interp<'_>, mut args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("sort", &args, 1)?;
    let items = match args.pop() {
        Some(Value::List(items)) => items,
        Some(other) => {
            return Err(EvalError::fault(format!(
                "`sort` needs a list, got {}",
                other.type_name()
            )))
        }
        None => return Err(EvalError::fault("`sort` expects 1 argument(s), got 0")),
    };

    let all_numeric = items
        .iter()
        .all(|v| matches!(v, Value::Int(_) | Value::Float(_)));
    let all_strings = items.iter().all(|v| matches!(v, Value::Str(_)));

    let mut sorted = items;
    if all_numeric {
        sorted.sort_by(|a, b| {
            let x = match a {
                Value::Int(v) => *v as f64,
                Value::Float(v) => *v,
                _ => 0.0,
            };
            let y = match b {
                Value::Int(v) => *v as f64,
                Value::Float(v) => *v,
                _ => 0.0,
            };
            x.total_cmp(&y)
        });
    } else if all_strings {
        sorted.sort_by(|a, b| match (a, b) {
            (Value::Str(x), Value::Str(y)) => x.cmp(y),
            _ => std::cmp::Ordering::Equal,
        });
    } else {
        return Err(EvalError::fault(
            "`sort` needs a list of numbers or a list of strings",
        ));
    }
    Ok(Value::List(sorted))
}

fn coll_range(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    let (start, end) = match args.len() {
        1 => match &args[0] {
            Value::Int(n) => (0, *n),
            other => {
                return Err(EvalError::fault(format!(
                    "`range` needs integers, got {}",
                    other.type_name()
                )))
            }
        },
        2 => match (&args[0], &args[1]) {
            (Value::Int(a), Value::Int(b)) => (*a, *b),
            _ => return Err(EvalError::fault("`range` needs integers")),
        },
        n => {
            return Err(EvalError::fault(format!(
                "`range` expects 1 or 2 argument(s), got {n}"
            )))
        }
    };

    if end.saturating_sub(start) > MAX_RANGE_LEN {
        return Err(EvalError::fault(format!(
            "`range` of {} elements exceeds the limit of {MAX_RANGE_LEN}",
            end.saturating_sub(start)
        )));
    }
    Ok(Value::List((start..end).map(Value::Int).collect()))
}

fn coll_keys(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("keys", &args, 1)?;
    match &args[0] {
        Value::Record(fields) => Ok(Value::List(
            fields.keys().map(|k| Value::Str(k.clone())).collect(),
        )),
        other => Err(EvalError::fault(format!(
            "`keys` needs a record, got {}",
            other.type_name()
        ))),
    }
}

// ── random ───────────────────────────────────────────────────────────────

fn random_float(_: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("random", &args, 0)?;
    Ok(Value::Float(rand::thread_rng().gen::<f64>()))
}

// ── inference ────────────────────────────────────────────────────────────
//
// These run against the interpreter's authoritative snapshot, never the
// agent's (freely mutable) copy of it. The `state` argument is accepted for
// call-site readability only.

fn inf_classify(interp: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("classify", &args, 1)?;
    let classification = inference::classify(interp.snapshot())?;
    let to_list = |set: &std::collections::BTreeSet<usize>| {
        Value::List(set.iter().map(|&i| Value::Int(i as i64)).collect())
    };
    let mut fields = std::collections::BTreeMap::new();
    fields.insert(
        "definite_answers".to_string(),
        to_list(&classification.definite_answers),
    );
    fields.insert(
        "definite_wrongs".to_string(),
        to_list(&classification.definite_wrongs),
    );
    Ok(Value::Record(fields))
}

fn inf_scores(interp: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("scores", &args, 1)?;
    let snapshot = interp.snapshot();
    let classification = inference::classify(snapshot)?;
    let scores = inference::score(snapshot, &classification);
    let values = (0..snapshot.pool_size())
        .map(|index| {
            let v = if classification.definite_answers.contains(&index) {
                100.0
            } else if classification.definite_wrongs.contains(&index) {
                0.0
            } else {
                scores.get(&index).copied().unwrap_or(50.0)
            };
            Value::Float(v)
        })
        .collect();
    Ok(Value::List(values))
}

fn inf_recommend(interp: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("recommend", &args, 1)?;
    let snapshot = interp.snapshot();
    let guess = inference::recommend(snapshot, snapshot.answer_count)?;
    Ok(Value::List(
        guess.into_iter().map(|i| Value::Int(i as i64)).collect(),
    ))
}

// ── log ──────────────────────────────────────────────────────────────────

fn log_line(interp: &mut Interp<'_>, args: Vec<Value>) -> Result<Value, EvalError> {
    expect_arity("log", &args, 1)?;
    interp.push_log(args[0].to_string());
    Ok(Value::Unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::capability::CapabilitySet;
    use crate::sandbox::script::ast::Program;
    use crate::sandbox::script::interp::InterpLimits;
    use crate::state::{GameStateSnapshot, GuessRecord, KeywordPool};

    fn state() -> GameStateSnapshot {
        let pool: KeywordPool = (0..6).map(|i| format!("kw{i}")).collect();
        GameStateSnapshot::new(pool, 2)
            .with_guess(GuessRecord::new("a", vec![0, 1], 1))
            .with_guess(GuessRecord::new("b", vec![0, 2], 2))
    }

    fn run(source: &str) -> Result<Value, EvalError> {
        let program = Program::load(source).unwrap();
        let snapshot = state();
        let caps = CapabilitySet::safe_default();
        let limits = InterpLimits::default();
        let mut interp = Interp::new(&program, &snapshot, &caps, &limits);
        interp.run()
    }

    #[test]
    fn test_math_builtins() {
        assert_eq!(
            run("fn make_guess(s) { return floor(random() * 0.0) + abs(-3) + min(1, 2); }")
                .unwrap(),
            Value::Int(4)
        );
        assert_eq!(
            run("fn make_guess(s) { return sqrt(9); }").unwrap(),
            Value::Float(3.0)
        );
    }

    #[test]
    fn test_floor_produces_an_index() {
        // The idiom agents use for random picks must type-check as an index.
        let v = run("fn make_guess(s) { let xs = [7, 8, 9]; return xs[floor(2.9)]; }").unwrap();
        assert_eq!(v, Value::Int(9));
    }

    #[test]
    fn test_collection_builtins() {
        assert_eq!(
            run("fn make_guess(s) { return sort([3, 1, 2]); }").unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            run("fn make_guess(s) { return contains([1, 2], 2); }").unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            run("fn make_guess(s) { return range(2, 5); }").unwrap(),
            Value::List(vec![Value::Int(2), Value::Int(3), Value::Int(4)])
        );
    }

    #[test]
    fn test_range_is_bounded() {
        let err = run("fn make_guess(s) { return range(100000000); }").unwrap_err();
        assert!(err.to_string().contains("exceeds the limit"));
    }

    #[test]
    fn test_inference_builtins_use_authoritative_snapshot() {
        // History proves 0 and 2 correct, 1 wrong (see `state()`).
        let v = run(
            "fn make_guess(state) {
                let c = classify(state);
                return c.definite_answers;
            }",
        )
        .unwrap();
        assert_eq!(v, Value::List(vec![Value::Int(0), Value::Int(2)]));
    }

    #[test]
    fn test_recommend_builtin_returns_full_guess() {
        let v = run("fn make_guess(state) { return recommend(state); }").unwrap();
        assert_eq!(v, Value::List(vec![Value::Int(0), Value::Int(2)]));
    }

    #[test]
    fn test_scores_builtin_is_pool_sized() {
        let v = run("fn make_guess(state) { return len(scores(state)); }").unwrap();
        assert_eq!(v, Value::Int(6));
    }

    #[test]
    fn test_wrong_arity_is_a_fault() {
        let err = run("fn make_guess(s) { return sqrt(1, 2); }").unwrap_err();
        assert!(err.to_string().contains("expects 1 argument"));
    }
}
