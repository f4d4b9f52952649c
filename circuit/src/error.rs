//! Error types for the step functions, manifests and sessions.

use commit::CommitError;
use field::Fr;
use thiserror::Error;

use crate::cipher::CipherSuite;

/// Invalid circuit parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// Chunks must cover whole AES and ChaCha20 blocks.
    #[error("data_bytes must be a non-zero multiple of 64, got {0}")]
    DataBytesAlignment(usize),

    /// The JSON parser needs room for the root value.
    #[error("max_stack_height must be at least 1")]
    ZeroStackHeight,

    /// More header slots than the HTTP match mask can track.
    #[error("max_number_of_headers must be at most 63, got {0}")]
    TooManyHeaders(usize),

    /// A parameter file that is not valid JSON.
    #[error("invalid parameter file: {0}")]
    Json(String),
}

/// A step witness that cannot satisfy its circuit.
///
/// Wrong keys, headers or paths are not errors: they produce an accumulator
/// that fails final verification. These variants cover inputs for which the
/// circuit would have no satisfying assignment at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    /// A witness array sized for different circuit parameters.
    #[error("{what} has length {actual}, the circuit expects {expected}")]
    ParameterMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A key of the wrong size for the cipher suite.
    #[error("{suite} needs a {expected}-byte key, got {actual}")]
    KeyLength {
        suite: CipherSuite,
        expected: usize,
        actual: usize,
    },

    /// Padding may only trail a chunk.
    #[error("padding at offset {0} is followed by data")]
    InteriorPadding(usize),

    /// The carried HTTP state was not the one the previous step committed to.
    #[error("HTTP machine state does not match the digest in step_in")]
    MachineStateMismatch,

    /// The carried JSON state was not the one the previous step committed to.
    #[error("JSON parser state does not match the digest in step_in")]
    ParserStateMismatch,

    /// The key path witness hashes to a different sequence digest.
    #[error("sequence digest does not match the hash in step_in")]
    SequenceDigestMismatch,

    /// A carried state with out-of-range fields.
    #[error("{0} is not a valid serialized state")]
    InvalidState(&'static str),

    /// Plaintext the HTTP machine cannot parse.
    #[error("malformed HTTP at offset {offset}: {reason}")]
    MalformedHttp { offset: usize, reason: &'static str },

    /// Body bytes the JSON machine cannot parse.
    #[error("malformed JSON at offset {offset}: {reason}")]
    MalformedJson { offset: usize, reason: &'static str },

    /// JSON nested deeper than the parser stack.
    #[error("JSON nesting exceeds the max stack height of {0}")]
    StackOverflow(usize),

    /// The keystream would run past the last 32-bit block counter.
    #[error("{len} keystream bytes from block {counter} overflow the block counter")]
    CounterOverflow { counter: u32, len: usize },
}

/// A manifest that cannot be turned into commitments.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// More header lines than the circuit has digest slots for.
    #[error("manifest declares {count} header values, the circuit supports {max}")]
    TooManyHeaders { count: usize, max: usize },

    /// A manifest that is not valid JSON or has the wrong shape.
    #[error("invalid manifest: {0}")]
    Json(#[from] serde_json::Error),

    /// The key path cannot be committed to.
    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// A final accumulator that does not match the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The first accumulator slot that disagrees with the manifest.
    #[error("slot {slot} ({name}): expected {expected}, got {actual}")]
    SlotMismatch {
        slot: usize,
        name: &'static str,
        expected: Fr,
        actual: Fr,
    },
}

/// Failure while driving a whole session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The circuit parameters are invalid.
    #[error(transparent)]
    Params(#[from] ParamsError),

    /// A step had no satisfying assignment.
    #[error(transparent)]
    Step(#[from] StepError),

    /// The manifest could not be committed to.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Hashing the ciphertext failed.
    #[error(transparent)]
    Commit(#[from] CommitError),

    /// There is no ciphertext to prove anything about.
    #[error("session has no records")]
    NoRecords,
}
