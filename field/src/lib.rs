//! The BN254 scalar field.
//!
//! This crate provides [`Fr`], a Montgomery-form implementation of the
//! scalar field of BN254 that plugs into the Plonky3 field traits, together
//! with helpers for random sampling. All commitments of the folding pipeline
//! (Poseidon digests, polynomial digests and the public accumulator) are
//! elements of this field.

mod bn254;
mod random;

pub use bn254::{Fr, ParseFrError};
pub use random::RandomField;
