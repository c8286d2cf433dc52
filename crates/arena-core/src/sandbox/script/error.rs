//! Error types for the agent script runtime.

use crate::inference::InferenceError;
use crate::sandbox::capability::Capability;

/// A syntax error in agent source text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: u32,
    pub message: String,
}

/// Why a program could not be loaded.
///
/// All variants are structural: the source never ran.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("agent must define a `make_guess(state)` entry point")]
    MissingEntryPoint,

    #[error("`make_guess` must take exactly one parameter, found {found}")]
    EntryPointArity { found: usize },

    #[error("duplicate function `{name}`")]
    DuplicateFunction { name: String },
}

/// A fault raised while agent code was running.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// A plain agent-side failure (type error, undefined variable, bad
    /// index, …). The message is forwarded to the orchestrator verbatim.
    #[error("{message}")]
    Fault { message: String },

    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("call to `{name}` denied: the `{capability}` capability is not granted")]
    CapabilityDenied { name: String, capability: Capability },

    #[error("execution deadline of {limit_ms}ms exceeded")]
    DeadlineExceeded { limit_ms: u64 },

    #[error("fuel budget of {budget} steps exhausted")]
    FuelExhausted { budget: u64 },

    #[error("call depth limit of {limit} exceeded")]
    CallDepthExceeded { limit: usize },

    /// An inference builtin hit an impossible game state. Not the agent's
    /// fault; surfaced separately so the controller can report it as such.
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl EvalError {
    pub(crate) fn fault(message: impl Into<String>) -> Self {
        Self::Fault {
            message: message.into(),
        }
    }
}
