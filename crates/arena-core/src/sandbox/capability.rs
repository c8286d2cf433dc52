//! Capabilities — the permission axis for the agent sandbox.
//!
//! The sandbox is default-deny: an agent can reach a builtin only when the
//! builtin's capability group is in the granted [`CapabilitySet`]. There is
//! no deny rule to forget — anything not granted does not exist inside the
//! sandbox.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A group of builtins an agent may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Safe arithmetic helpers: `abs`, `min`, `max`, `floor`, `ceil`,
    /// `round`, `sqrt`, `pow`.
    Math,
    /// List/record helpers: `len`, `push`, `contains`, `sort`, `range`,
    /// `keys`.
    Collections,
    /// `random()` — uniform float in `[0, 1)`.
    Random,
    /// Read-only access to the inference engine: `classify`, `scores`,
    /// `recommend`.
    Inference,
    /// `log(value)` — append a line to the execution's diagnostic log.
    Log,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Math => write!(f, "math"),
            Capability::Collections => write!(f, "collections"),
            Capability::Random => write!(f, "random"),
            Capability::Inference => write!(f, "inference"),
            Capability::Log => write!(f, "log"),
        }
    }
}

/// The set of capability groups granted to one execution.
///
/// Empty means nothing beyond the core language (arithmetic, control flow,
/// data structures) is reachable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    granted: BTreeSet<Capability>,
}

impl CapabilitySet {
    /// The empty set: every builtin call is denied.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard surface for arena play: safe math, collections, random,
    /// inference access, and logging. Nothing that touches time, I/O, or the
    /// host exists to be granted.
    pub fn safe_default() -> Self {
        Self::empty()
            .grant(Capability::Math)
            .grant(Capability::Collections)
            .grant(Capability::Random)
            .grant(Capability::Inference)
            .grant(Capability::Log)
    }

    /// Add a capability (builder form).
    pub fn grant(mut self, capability: Capability) -> Self {
        self.granted.insert(capability);
        self
    }

    /// Returns `true` when `capability` has been granted.
    pub fn allows(&self, capability: Capability) -> bool {
        self.granted.contains(&capability)
    }

    /// Granted capabilities, in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.granted.iter().copied()
    }

    /// Number of granted capabilities.
    pub fn len(&self) -> usize {
        self.granted.len()
    }

    /// Returns `true` when nothing is granted.
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_denies_everything() {
        let set = CapabilitySet::empty();
        assert!(!set.allows(Capability::Math));
        assert!(!set.allows(Capability::Log));
        assert!(set.is_empty());
    }

    #[test]
    fn test_safe_default_grants_the_fixed_surface() {
        let set = CapabilitySet::safe_default();
        for cap in [
            Capability::Math,
            Capability::Collections,
            Capability::Random,
            Capability::Inference,
            Capability::Log,
        ] {
            assert!(set.allows(cap), "expected {cap} granted");
        }
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn test_grant_is_additive() {
        let set = CapabilitySet::empty().grant(Capability::Math);
        assert!(set.allows(Capability::Math));
        assert!(!set.allows(Capability::Random));
    }

    #[test]
    fn test_serde_roundtrip() {
        let set = CapabilitySet::empty()
            .grant(Capability::Math)
            .grant(Capability::Inference);
        let json = serde_json::to_string(&set).unwrap();
        let back: CapabilitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(set, back);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Capability::Math.to_string(), "math");
        assert_eq!(Capability::Collections.to_string(), "collections");
        assert_eq!(Capability::Inference.to_string(), "inference");
    }
}
