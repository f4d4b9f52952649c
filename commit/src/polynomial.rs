//! Polynomial evaluation commitments.
//!
//! A byte string `b` is committed to as `sum(b_i * x^i)` for a public point
//! `x`. Shifting the exponent by the number of bytes already committed makes
//! the commitment additive over concatenation, which is what lets a stream be
//! digested chunk by chunk.

use field::Fr;
use p3_field::PrimeCharacteristicRing;

/// `sum(bytes[i] * x^(start_power + i))`.
pub fn polynomial_digest(bytes: &[u8], x: Fr, start_power: u64) -> Fr {
    let mut monomial = x.exp_u64(start_power);
    let mut acc = Fr::ZERO;
    for &byte in bytes {
        acc += Fr::from(byte) * monomial;
        monomial *= x;
    }
    acc
}

/// `counter * sum(bytes[i] * x^i)`, skipping padding.
///
/// `counter` is the running power `x^n` of a length commitment, so this is
/// [`polynomial_digest`] with a start power that is only known in committed
/// form.
pub fn polynomial_digest_with_counter(bytes: &[Option<u8>], x: Fr, counter: Fr) -> Fr {
    let mut monomial = counter;
    let mut acc = Fr::ZERO;
    for byte in bytes {
        if let Some(byte) = byte {
            acc += Fr::from(*byte) * monomial;
        }
        monomial *= x;
    }
    acc
}

/// `sum(elements[i] * x^i)`, used to commit to serialized machine states.
pub fn polynomial_digest_elements(elements: &[Fr], x: Fr) -> Fr {
    elements.iter().rev().fold(Fr::ZERO, |acc, &e| acc * x + e)
}
