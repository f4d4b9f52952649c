//! The public accumulator threaded between steps.
//!
//! Every step kind reads and writes the same fixed-width vector, so the
//! output of any step can be fed to any other. Slots a step does not own are
//! passed through unchanged.

use core::ops::{Index, IndexMut};

use field::Fr;
use serde::{Deserialize, Serialize};

use crate::params::PUBLIC_IO_VARIABLES;

/// Running substitution ledger: ciphertext, then plaintext, body and value digests.
pub const GLOBAL_DIGEST: usize = 0;
/// `x^n` for the number of plaintext bytes authenticated.
pub const PLAINTEXT_LENGTH: usize = 1;
/// `x^n` for the number of plaintext bytes parsed as HTTP.
pub const HTTP_LENGTH: usize = 2;
/// Digest of the serialized HTTP machine state, zero before parsing starts.
pub const HTTP_MACHINE_STATE: usize = 3;
/// Sum of `Poseidon(line digest)` over matched start line and headers.
pub const HEADERS_DIGEST: usize = 4;
/// Declared start line and headers not matched yet.
pub const UNMATCHED_STATEMENTS: usize = 5;
/// `x^n` for the number of body bytes emitted by the HTTP step.
pub const BODY_LENGTH: usize = 6;
/// `x^n` for the number of body bytes consumed by the JSON step.
pub const JSON_LENGTH: usize = 7;
/// Digest of the serialized JSON parser state.
pub const JSON_STATE: usize = 8;
/// `Poseidon(sequence digest)` of the key path being extracted.
pub const SEQUENCE_DIGEST_HASH: usize = 9;
/// Running data hash of the ciphertext, written only by authentication.
pub const CIPHERTEXT_CARRY: usize = 10;

const SLOT_NAMES: [&str; PUBLIC_IO_VARIABLES] = [
    "global digest",
    "plaintext length",
    "http length",
    "http machine state",
    "headers digest",
    "unmatched statements",
    "body length",
    "json length",
    "json state",
    "sequence digest hash",
    "ciphertext carry",
];

/// Human readable name of an accumulator slot.
pub fn slot_name(slot: usize) -> &'static str {
    SLOT_NAMES.get(slot).copied().unwrap_or("unknown")
}

/// `step_in` / `step_out` of a folding step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicIo(pub [Fr; PUBLIC_IO_VARIABLES]);

impl PublicIo {
    pub fn zero() -> Self {
        Self([Fr::ZERO; PUBLIC_IO_VARIABLES])
    }

    pub fn as_slice(&self) -> &[Fr] {
        &self.0
    }

    /// Compact binary snapshot of the accumulator.
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

impl Index<usize> for PublicIo {
    type Output = Fr;

    fn index(&self, slot: usize) -> &Fr {
        &self.0[slot]
    }
}

impl IndexMut<usize> for PublicIo {
    fn index_mut(&mut self, slot: usize) -> &mut Fr {
        &mut self.0[slot]
    }
}

impl From<[Fr; PUBLIC_IO_VARIABLES]> for PublicIo {
    fn from(slots: [Fr; PUBLIC_IO_VARIABLES]) -> Self {
        Self(slots)
    }
}

#[cfg(test)]
mod tests {
    use p3_field::PrimeCharacteristicRing;

    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let mut io = PublicIo::zero();
        io[GLOBAL_DIGEST] = Fr::from_canonical_u64(17);
        io[CIPHERTEXT_CARRY] = Fr::NEG_ONE;
        let bytes = io.to_bytes().expect("serialize");
        assert_eq!(PublicIo::from_bytes(&bytes).expect("deserialize"), io);
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(slot_name(UNMATCHED_STATEMENTS), "unmatched statements");
        assert_eq!(slot_name(PUBLIC_IO_VARIABLES), "unknown");
    }
}
