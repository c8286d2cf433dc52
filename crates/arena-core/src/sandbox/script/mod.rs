//! The agent language: a small embedded interpreter for untrusted code.
//!
//! Agents submit plain source text defining a `make_guess(state)` function.
//! The language is deliberately tiny — integers, floats, booleans, strings,
//! lists, read-only records, `let`/assignment, `if`/`while`/`for`, helper
//! functions — and has **no** host surface: every reachable builtin lives in
//! [`builtins`] behind a [`Capability`](crate::sandbox::capability::Capability)
//! grant, and nothing else exists inside the sandbox. Division always yields
//! a float; `floor()` turns one back into an index.
//!
//! Execution is metered: every step charges fuel and the wall-clock deadline
//! is enforced inside the dispatch loop, so a hostile tight loop is cut off
//! without any cooperation from the agent.
//!
//! # Modules
//!
//! - [`token`]    — lexer
//! - [`ast`]      — syntax tree + [`Program::load`] structural checks
//! - [`parser`]   — recursive-descent parser
//! - [`value`]    — runtime [`Value`] model and snapshot conversion
//! - [`interp`]   — the metered tree-walking interpreter
//! - [`builtins`] — the capability-gated builtin registry
//! - [`error`]    — [`ParseError`] / [`LoadError`] / [`EvalError`]

pub mod ast;
pub mod builtins;
pub mod error;
pub mod interp;
pub mod parser;
pub mod token;
pub mod value;

pub use ast::{Program, ENTRY_POINT};
pub use error::{EvalError, LoadError, ParseError};
pub use interp::{Interp, InterpLimits};
pub use value::{snapshot_value, Value};
