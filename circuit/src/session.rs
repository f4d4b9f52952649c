//! Drives a full chain of steps over an encrypted response.
//!
//! The witness generator side of the pipeline: it pads and chunks the
//! ciphertext, derives the ciphertext digest, runs every authentication
//! chunk, re-chunks the recovered plaintext for HTTP verification and the
//! emitted body for JSON extraction, and records each accumulator on the way.

use commit::data_hasher;
use field::Fr;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::authentication::{AuthenticationWitness, PlaintextAuthentication};
use crate::chunk::{split_padded, unpad};
use crate::cipher::{derive_nonce, CipherSuite, NONCE_LEN};
use crate::error::{SessionError, StepError, VerificationError};
use crate::http::{HttpMachineState, HttpVerification, HttpWitness};
use crate::json::{locate_value, JsonExtraction, JsonParserState, JsonWitness};
use crate::manifest::{Manifest, ManifestCommitments};
use crate::params::CircuitParams;
use crate::public_io::PublicIo;
use crate::step::Step;

/// One encrypted TLS record of the response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsRecord {
    pub suite: CipherSuite,
    pub key: Vec<u8>,
    pub iv: [u8; NONCE_LEN],
    pub sequence: u64,
    pub ciphertext: Vec<u8>,
}

impl TlsRecord {
    /// Encrypts `plaintext` as record number `sequence`.
    pub fn seal(
        suite: CipherSuite,
        key: &[u8],
        iv: [u8; NONCE_LEN],
        sequence: u64,
        plaintext: &[u8],
    ) -> Result<Self, StepError> {
        let mut ciphertext = plaintext.to_vec();
        suite.apply_keystream(
            key,
            &derive_nonce(&iv, sequence),
            suite.initial_counter(),
            &mut ciphertext,
        )?;
        Ok(Self {
            suite,
            key: key.to_vec(),
            iv,
            sequence,
            ciphertext,
        })
    }

    pub fn nonce(&self) -> [u8; NONCE_LEN] {
        derive_nonce(&self.iv, self.sequence)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    Authentication,
    Http,
    Json,
}

/// One step of the chain and the accumulators around it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub kind: StepKind,
    pub step_in: PublicIo,
    pub step_out: PublicIo,
}

/// Everything a run produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTrace {
    pub commitments: ManifestCommitments,
    /// Digest of the extracted value, zero when the path was not found.
    pub value_digest: Fr,
    /// Raw bytes of the extracted value.
    pub value: Option<Vec<u8>>,
    pub steps: Vec<TraceEntry>,
}

impl SessionTrace {
    /// Accumulator after the last step.
    pub fn step_out(&self) -> PublicIo {
        self.steps
            .last()
            .map(|entry| entry.step_out)
            .unwrap_or_else(|| self.commitments.initial_step_in())
    }

    pub fn verify(&self) -> Result<(), VerificationError> {
        self.commitments
            .verify_step_out(&self.step_out(), self.value_digest)
    }

    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|entry| entry.kind == kind).count()
    }
}

/// Runs the authentication, HTTP and JSON steps for one manifest.
#[derive(Clone, Debug)]
pub struct Session {
    params: CircuitParams,
    manifest: Manifest,
}

impl Session {
    pub fn new(params: CircuitParams, manifest: Manifest) -> Result<Self, SessionError> {
        params.validate()?;
        Ok(Self { params, manifest })
    }

    pub fn params(&self) -> &CircuitParams {
        &self.params
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Proves the whole response chunk by chunk, in stream order.
    pub fn run(&self, records: &[TlsRecord]) -> Result<SessionTrace, SessionError> {
        if records.is_empty() {
            return Err(SessionError::NoRecords);
        }
        let data_bytes = self.params.data_bytes;

        // Each record is chunked on its own so keystream counters restart.
        let chunks: Vec<_> = records
            .iter()
            .flat_map(|record| {
                split_padded(&record.ciphertext, data_bytes)
                    .into_iter()
                    .enumerate()
                    .map(move |(i, chunk)| (record, i * data_bytes, chunk))
            })
            .collect();
        let x = chunks
            .iter()
            .fold(Fr::ZERO, |acc, (_, _, chunk)| data_hasher(chunk, acc));

        let commitments = self.manifest.commitments(x, &self.params)?;
        info!(
            "session: {} records, {} ciphertext chunks, {} declared statements",
            records.len(),
            chunks.len(),
            commitments.statements
        );

        let mut steps = Vec::new();
        let mut io = commitments.initial_step_in();
        let mut record_step = |kind, step_in: PublicIo, step_out: PublicIo| {
            steps.push(TraceEntry {
                kind,
                step_in,
                step_out,
            });
            step_out
        };

        let auth = PlaintextAuthentication::new(self.params);
        let mut plaintext = Vec::new();
        for (record, offset, chunk) in chunks {
            let witness = AuthenticationWitness {
                suite: record.suite,
                key: record.key.clone(),
                nonce: record.nonce(),
                counter: record.suite.counter_at(offset),
                ciphertext: chunk,
                ciphertext_digest: x,
            };
            let out = auth.step(&io, &witness)?;
            plaintext.extend(unpad(&out.carry));
            io = record_step(StepKind::Authentication, io, out.step_out);
        }
        debug!("recovered {} plaintext bytes", plaintext.len());

        let http = HttpVerification::new(self.params);
        let mut machine_state = HttpMachineState::default().to_fields();
        let mut body = Vec::new();
        for chunk in split_padded(&plaintext, data_bytes) {
            let witness = HttpWitness {
                data: chunk,
                ciphertext_digest: x,
                machine_state,
                main_digests: commitments.main_digests.clone(),
            };
            let out = http.step(&io, &witness)?;
            machine_state = out.carry.machine_state;
            body.extend(out.carry.body);
            io = record_step(StepKind::Http, io, out.step_out);
        }
        debug!("HTTP body has {} bytes", body.len());

        let located = locate_value(
            &body,
            x,
            commitments.sequence_digest,
            self.params.max_stack_height,
        )?;
        let (value_digest, value) = match located {
            Some(found) => (found.digest, Some(found.bytes)),
            None => {
                warn!("key path not found in the response body");
                (Fr::ZERO, None)
            }
        };

        let json = JsonExtraction::new(self.params);
        let mut state = JsonParserState::new(self.params.max_stack_height).to_fields();
        for chunk in split_padded(&body, data_bytes) {
            let witness = JsonWitness {
                data: chunk,
                ciphertext_digest: x,
                sequence_digest: commitments.sequence_digest,
                value_digest,
                state,
            };
            let out = json.step(&io, &witness)?;
            state = out.carry;
            io = record_step(StepKind::Json, io, out.step_out);
        }

        info!("session: ran {} steps", steps.len());
        Ok(SessionTrace {
            commitments,
            value_digest,
            value,
            steps,
        })
    }
}
