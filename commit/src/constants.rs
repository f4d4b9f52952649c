//! Constants used by the commitment primitives.

/// Largest number of field elements a single Poseidon call absorbs.
///
/// Longer inputs go through [`crate::poseidon_modular`], which splits them
/// into groups of this size.
pub const MAX_POSEIDON_INPUTS: usize = 16;

/// Number of full rounds, split evenly before and after the partial rounds.
pub(crate) const FULL_ROUNDS: usize = 8;

/// Partial round counts indexed by `width - 2`.
///
/// These are the counts of the circom/iden3 parameter set for the BN254
/// scalar field with the x^5 S-box at 128-bit security.
pub(crate) const PARTIAL_ROUNDS: [usize; MAX_POSEIDON_INPUTS] = [
    56, 57, 56, 60, 60, 63, 64, 63, 60, 66, 60, 65, 70, 60, 64, 68,
];

/// Bit length of the BN254 scalar field modulus.
pub(crate) const FIELD_BITS: u16 = 254;

/// Bytes packed into one field element by the data hasher.
///
/// A word is read little-endian, so 16 bytes always fit below the modulus.
pub const DATA_HASHER_WORD_BYTES: usize = 16;

/// Coefficients contributed by one stack entry to a compressed tree hash:
/// container kind, index-or-one, and key hash.
pub const TREE_HASH_STRIDE: usize = 3;
