//! Commitment primitives over the BN254 scalar field.
//!
//! This library provides the hashing and digest building blocks shared by
//! every step of the folding pipeline:
//! - Poseidon for 1 through 16 inputs, bit-compatible with circomlib
//! - `poseidon_modular`, which chains Poseidon over sequences of any length
//! - `data_hasher`, a padding-aware running hash over byte streams
//! - polynomial digests, additive commitments to byte strings
//! - key path commitments for JSON extraction
//!
//! # Example
//!
//! ```
//! use commit::{data_hasher_bytes, polynomial_digest, poseidon_hash};
//! use field::Fr;
//!
//! let ciphertext = b"some encrypted bytes";
//! let x = data_hasher_bytes(ciphertext);
//!
//! // Digests of two halves add up to the digest of the whole.
//! let whole = polynomial_digest(b"hello world", x, 0);
//! let parts = polynomial_digest(b"hello ", x, 0) + polynomial_digest(b"world", x, 6);
//! assert_eq!(whole, parts);
//!
//! let h = poseidon_hash(&[Fr::from_canonical_u64(1), Fr::from_canonical_u64(2)]).unwrap();
//! assert_eq!(
//!     h.to_hex(),
//!     "0x115cc0f5e7d690413df64c6b9662e9cf2a3617f2743245519e19607a4417189a"
//! );
//! ```

mod constants;
mod data_hasher;
mod errors;
mod grain;
mod modular;
mod polynomial;
mod poseidon;
mod tree;


pub use constants::{DATA_HASHER_WORD_BYTES, MAX_POSEIDON_INPUTS, TREE_HASH_STRIDE};
pub use data_hasher::{data_hasher, data_hasher_bytes};
pub use errors::CommitError;
pub use modular::poseidon_modular;
pub use polynomial::{
    polynomial_digest, polynomial_digest_elements, polynomial_digest_with_counter,
};
pub use poseidon::{
    hash_one, hash_two, poseidon_compression, poseidon_hash, PoseidonCompression, PoseidonHasher,
    PoseidonPermutation,
};
pub use tree::{
    compress_tree_hash, json_tree_hasher, sequence_digest, KeyPathElement, StackEntry,
    KIND_ARRAY, KIND_NONE, KIND_OBJECT,
};
