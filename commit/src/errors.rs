//! Error types for the commitment primitives.

use thiserror::Error;

/// Errors raised while building a commitment.
///
/// All of these are setup errors: they depend only on input sizes, never on
/// input values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// Poseidon is only instantiated for 1 through 16 inputs.
    #[error("poseidon arity {0} is outside 1..=16")]
    UnsupportedArity(usize),

    /// `poseidon_modular` needs at least one element to hash.
    #[error("cannot hash an empty sequence")]
    EmptyInput,

    /// A key path is deeper than the JSON parser stack.
    #[error("key path depth {depth} exceeds max stack height {max}")]
    PathTooDeep { depth: usize, max: usize },
}
