//! Plaintext authentication: decrypt a ciphertext chunk and swap its
//! commitment for a commitment to the plaintext.
//!
//! The ciphertext side of the ledger is a running [`data_hasher`] kept in
//! [`CIPHERTEXT_CARRY`]. When that running hash reaches the public
//! `ciphertext_digest`, the whole ciphertext has been consumed and the digest
//! is subtracted from [`GLOBAL_DIGEST`] once. The plaintext side is added chunk
//! by chunk as a polynomial digest at `x = ciphertext_digest`, positioned by
//! the length commitment in [`PLAINTEXT_LENGTH`].

use commit::{data_hasher, polynomial_digest_with_counter};
use field::Fr;
use p3_field::PrimeCharacteristicRing;
use tracing::debug;

use crate::chunk::{check_chunk, pad, PaddedChunk};
use crate::cipher::{CipherSuite, NONCE_LEN};
use crate::error::StepError;
use crate::params::CircuitParams;
use crate::public_io::{PublicIo, CIPHERTEXT_CARRY, GLOBAL_DIGEST, PLAINTEXT_LENGTH};
use crate::step::{Step, StepOutput};

/// Private inputs of one authentication step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticationWitness {
    pub suite: CipherSuite,
    pub key: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    /// Block counter of the first keystream block of this chunk.
    pub counter: u32,
    /// `data_bytes` positions of ciphertext, padded at the end.
    pub ciphertext: PaddedChunk,
    /// Data hash of the entire padded ciphertext stream.
    pub ciphertext_digest: Fr,
}

/// Decrypts one chunk and folds it into the accumulator.
#[derive(Clone, Debug)]
pub struct PlaintextAuthentication {
    params: CircuitParams,
}

impl PlaintextAuthentication {
    pub fn new(params: CircuitParams) -> Self {
        Self { params }
    }
}

impl Step for PlaintextAuthentication {
    type Witness = AuthenticationWitness;
    /// The recovered plaintext chunk, padded like the ciphertext.
    type Carry = PaddedChunk;

    fn step(
        &self,
        step_in: &PublicIo,
        witness: &AuthenticationWitness,
    ) -> Result<StepOutput<PaddedChunk>, StepError> {
        let real = check_chunk(&witness.ciphertext, self.params.data_bytes)?;
        let x = witness.ciphertext_digest;

        let mut plaintext: Vec<u8> = witness.ciphertext[..real]
            .iter()
            .flatten()
            .copied()
            .collect();
        witness
            .suite
            .apply_keystream(&witness.key, &witness.nonce, witness.counter, &mut plaintext)?;
        let plaintext = pad(&plaintext, self.params.data_bytes);

        let running = data_hasher(&witness.ciphertext, step_in[CIPHERTEXT_CARRY]);
        let pt_digest = polynomial_digest_with_counter(&plaintext, x, step_in[PLAINTEXT_LENGTH]);
        let is_final = Fr::from(running == x);

        let mut step_out = *step_in;
        step_out[GLOBAL_DIGEST] = step_in[GLOBAL_DIGEST] + pt_digest - is_final * x;
        step_out[PLAINTEXT_LENGTH] = step_in[PLAINTEXT_LENGTH] * x.exp_u64(real as u64);
        step_out[CIPHERTEXT_CARRY] = running;

        debug!(
            "authenticated {} bytes with {} at counter {} (final: {})",
            real, witness.suite, witness.counter, running == x
        );

        Ok(StepOutput {
            step_out,
            carry: plaintext,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{split_padded, unpad};

    fn params() -> CircuitParams {
        CircuitParams::new(64, 3, 4).expect("valid")
    }

    #[test]
    fn test_single_chunk_replaces_ciphertext_digest() {
        let suite = CipherSuite::Aes128Gcm;
        let key = vec![3u8; 16];
        let nonce = [9u8; NONCE_LEN];
        let plaintext = b"HTTP/1.1 200 OK\r\n\r\n{}".to_vec();

        let mut ciphertext = plaintext.clone();
        suite
            .apply_keystream(&key, &nonce, 2, &mut ciphertext)
            .expect("encrypt");
        let chunk = split_padded(&ciphertext, 64).remove(0);
        let x = data_hasher(&chunk, Fr::ZERO);

        let mut step_in = PublicIo::zero();
        step_in[GLOBAL_DIGEST] = x;
        step_in[PLAINTEXT_LENGTH] = Fr::ONE;

        let witness = AuthenticationWitness {
            suite,
            key,
            nonce,
            counter: 2,
            ciphertext: chunk,
            ciphertext_digest: x,
        };
        let out = PlaintextAuthentication::new(params())
            .step(&step_in, &witness)
            .expect("step");

        assert_eq!(unpad(&out.carry), plaintext);
        assert_eq!(
            out.step_out[GLOBAL_DIGEST],
            commit::polynomial_digest(&plaintext, x, 0)
        );
        assert_eq!(out.step_out[PLAINTEXT_LENGTH], x.exp_u64(plaintext.len() as u64));
        assert_eq!(out.step_out[CIPHERTEXT_CARRY], x);
    }

    #[test]
    fn test_wrong_chunk_size() {
        let witness = AuthenticationWitness {
            suite: CipherSuite::Aes128Gcm,
            key: vec![0; 16],
            nonce: [0; NONCE_LEN],
            counter: 2,
            ciphertext: vec![Some(0); 32],
            ciphertext_digest: Fr::ONE,
        };
        let err = PlaintextAuthentication::new(params())
            .step(&PublicIo::zero(), &witness)
            .unwrap_err();
        assert!(matches!(err, StepError::ParameterMismatch { expected: 64, actual: 32, .. }));
    }
}
