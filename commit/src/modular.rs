//! Poseidon over sequences of arbitrary length.

use field::Fr;

use crate::constants::MAX_POSEIDON_INPUTS;
use crate::errors::CommitError;
use crate::poseidon::{hash_two, poseidon_hash};

/// Hashes an arbitrarily long sequence in groups of at most sixteen.
///
/// Each group is hashed with the Poseidon instance matching its length, and
/// group digests are chained as `h_i = Poseidon(h_{i-1}, Poseidon(group_i))`
/// starting from `h_0 = Poseidon(group_0)`. Only the final group can be
/// shorter than sixteen.
///
/// # Errors
///
/// Returns [`CommitError::EmptyInput`] when `elements` is empty.
pub fn poseidon_modular(elements: &[Fr]) -> Result<Fr, CommitError> {
    let mut groups = elements.chunks(MAX_POSEIDON_INPUTS);
    let first = groups.next().ok_or(CommitError::EmptyInput)?;

    groups.try_fold(poseidon_hash(first)?, |acc, group| {
        Ok(hash_two(acc, poseidon_hash(group)?))
    })
}
