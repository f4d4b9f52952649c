//! Manifests: what a proof asserts about a response, and the commitments
//! derived from it.
//!
//! A manifest names the expected start line, a set of headers and a key path
//! into the JSON body. [`Manifest::commitments`] turns it into the values the
//! step circuits check against, the initial accumulator, and the terminal
//! checks applied to the accumulator after the last step.

use std::collections::BTreeMap;

use commit::{hash_one, polynomial_digest, sequence_digest, KeyPathElement};
use field::Fr;
use serde::{Deserialize, Serialize};

use crate::error::{ManifestError, VerificationError};
use crate::http::HttpMachineState;
use crate::params::CircuitParams;
use crate::public_io::{
    slot_name, PublicIo, BODY_LENGTH, CIPHERTEXT_CARRY, GLOBAL_DIGEST, HEADERS_DIGEST,
    HTTP_LENGTH, HTTP_MACHINE_STATE, JSON_LENGTH, JSON_STATE, PLAINTEXT_LENGTH,
    SEQUENCE_DIGEST_HASH, UNMATCHED_STATEMENTS,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestBody {
    /// Key path of the value to extract.
    pub json: Vec<KeyPathElement>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestResponse {
    pub version: String,
    pub status: String,
    pub message: String,
    /// Header name to the values that must appear, one header line each.
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub body: ManifestBody,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub response: ManifestResponse,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn start_line(&self) -> String {
        let r = &self.response;
        format!("{} {} {}", r.version, r.status, r.message)
    }

    /// Declared header lines as the HTTP step digests them: lowercase name,
    /// a colon, one space, then the value.
    pub fn header_lines(&self) -> Vec<String> {
        self.response
            .headers
            .iter()
            .flat_map(|(name, values)| {
                let name = name.to_ascii_lowercase();
                values.iter().map(move |value| format!("{name}: {value}"))
            })
            .collect()
    }

    pub fn key_path(&self) -> &[KeyPathElement] {
        &self.response.body.json
    }

    /// Derives every commitment for the session whose ciphertext digest is `x`.
    ///
    /// # Errors
    ///
    /// Fails when more header lines are declared than the circuit has slots
    /// for, or when the key path is deeper than the JSON stack.
    pub fn commitments(
        &self,
        x: Fr,
        params: &CircuitParams,
    ) -> Result<ManifestCommitments, ManifestError> {
        let header_lines = self.header_lines();
        if header_lines.len() > params.max_number_of_headers {
            return Err(ManifestError::TooManyHeaders {
                count: header_lines.len(),
                max: params.max_number_of_headers,
            });
        }

        let mut main_digests: Vec<Fr> = std::iter::once(self.start_line())
            .chain(header_lines)
            .map(|line| polynomial_digest(line.as_bytes(), x, 0))
            .collect();
        let statements = main_digests.len();
        let headers_digest: Fr = main_digests.iter().copied().map(hash_one).sum();
        main_digests.resize(params.main_digests_len(), Fr::ZERO);

        Ok(ManifestCommitments {
            ciphertext_digest: x,
            main_digests,
            statements,
            headers_digest,
            sequence_digest: sequence_digest(x, self.key_path(), params.max_stack_height)?,
        })
    }
}

/// Public values derived from a manifest and a ciphertext digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCommitments {
    pub ciphertext_digest: Fr,
    /// Start line digest followed by header line digests, zero padded.
    pub main_digests: Vec<Fr>,
    /// Number of non-padding entries in `main_digests`.
    pub statements: usize,
    pub headers_digest: Fr,
    pub sequence_digest: Fr,
}

impl ManifestCommitments {
    /// The accumulator fed to the first authentication step.
    pub fn initial_step_in(&self) -> PublicIo {
        let x = self.ciphertext_digest;
        let mut io = PublicIo::zero();
        io[GLOBAL_DIGEST] = x;
        io[PLAINTEXT_LENGTH] = Fr::ONE;
        io[HTTP_LENGTH] = Fr::ONE;
        io[UNMATCHED_STATEMENTS] = Fr::from_canonical_u64(self.statements as u64);
        io[BODY_LENGTH] = Fr::ONE;
        io[JSON_LENGTH] = Fr::ONE;
        io[SEQUENCE_DIGEST_HASH] = hash_one(self.sequence_digest);
        io
    }

    /// Checks the accumulator after the last step, reporting the first slot
    /// that disagrees.
    pub fn verify_step_out(
        &self,
        step_out: &PublicIo,
        value_digest: Fr,
    ) -> Result<(), VerificationError> {
        let x = self.ciphertext_digest;
        let checks = [
            (GLOBAL_DIGEST, value_digest),
            (HTTP_LENGTH, step_out[PLAINTEXT_LENGTH]),
            (HTTP_MACHINE_STATE, HttpMachineState::in_body().digest(x)),
            (HEADERS_DIGEST, self.headers_digest),
            (UNMATCHED_STATEMENTS, Fr::ZERO),
            (JSON_LENGTH, step_out[BODY_LENGTH]),
            (JSON_STATE, Fr::ZERO),
            (SEQUENCE_DIGEST_HASH, hash_one(self.sequence_digest)),
            (CIPHERTEXT_CARRY, x),
        ];

        for (slot, expected) in checks {
            if step_out[slot] != expected {
                return Err(VerificationError::SlotMismatch {
                    slot,
                    name: slot_name(slot),
                    expected,
                    actual: step_out[slot],
                });
            }
        }
        Ok(())
    }
}
