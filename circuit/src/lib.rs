//! # Folded Web-Proof Step Circuits
//!
//! Step functions for proving facts about an encrypted HTTP response one
//! bounded chunk at a time. Each step reads a fixed-width public accumulator,
//! processes `data_bytes` bytes of private input, and writes the accumulator
//! for the next step. The steps are heterogeneous but share one accumulator
//! layout, so any step's output can feed any other step.
//!
//! ## Overview
//!
//! A chain proves three things about a response:
//! 1. the ciphertext decrypts under the committed key to a given plaintext
//!    ([`PlaintextAuthentication`]),
//! 2. the plaintext is an HTTP/1.x response whose start line and declared
//!    headers match a manifest ([`HttpVerification`]),
//! 3. the response body is JSON holding a value at the manifest's key path
//!    ([`JsonExtraction`]).
//!
//! Slot 0 of the accumulator is a substitution ledger. It starts as the
//! ciphertext digest `x`; authentication swaps it for a polynomial digest of
//! the plaintext, HTTP verification swaps that for a digest of the body, and
//! JSON extraction swaps the body for the digest of the extracted value. All
//! polynomial digests are evaluated at `x`, so a prover cannot choose data
//! after seeing the challenge.
//!
//! ## Accumulator Layout
//!
//! | slot | constant | meaning |
//! |------|----------|---------|
//! | 0  | [`GLOBAL_DIGEST`] | substitution ledger |
//! | 1  | [`PLAINTEXT_LENGTH`] | `x^n`, plaintext bytes authenticated |
//! | 2  | [`HTTP_LENGTH`] | `x^n`, bytes parsed as HTTP |
//! | 3  | [`HTTP_MACHINE_STATE`] | digest of the HTTP parser state |
//! | 4  | [`HEADERS_DIGEST`] | sum of `Poseidon(line)` over matched lines |
//! | 5  | [`UNMATCHED_STATEMENTS`] | declared lines still unmatched |
//! | 6  | [`BODY_LENGTH`] | `x^n`, body bytes emitted |
//! | 7  | [`JSON_LENGTH`] | `x^n`, body bytes parsed as JSON |
//! | 8  | [`JSON_STATE`] | digest of the JSON parser state |
//! | 9  | [`SEQUENCE_DIGEST_HASH`] | `Poseidon(sequence digest)` |
//! | 10 | [`CIPHERTEXT_CARRY`] | running data hash of the ciphertext |
//!
//! ## Quick Start
//!
//! ```rust
//! use circuit::{CipherSuite, CircuitParams, Manifest, Session, TlsRecord};
//!
//! let manifest = Manifest::from_json(r#"{
//!     "response": {
//!         "version": "HTTP/1.1", "status": "200", "message": "OK",
//!         "headers": { "Content-Type": ["application/json"] },
//!         "body": { "json": [ {"type": "Object", "value": "name"} ] }
//!     }
//! }"#).unwrap();
//!
//! let response = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"name\": \"Ada\"}";
//! let record = TlsRecord::seal(CipherSuite::Aes128Gcm, &[1u8; 16], [2u8; 12], 0, response)
//!     .unwrap();
//!
//! let session = Session::new(CircuitParams::new(64, 3, 4).unwrap(), manifest).unwrap();
//! let trace = session.run(&[record]).unwrap();
//! assert_eq!(trace.value.as_deref(), Some(&b"Ada"[..]));
//! assert!(trace.verify().is_ok());
//! ```
//!
//! ## Resuming Across Chunks
//!
//! HTTP and JSON parsing keep their state in a private carry that the next
//! chunk receives as witness. The accumulator only holds a polynomial digest
//! of that state, and a step refuses to run when the witness state does not
//! hash to the digest in `step_in`.
//!
//! ## Failure Model
//!
//! Undeclared headers are not errors: they produce an accumulator that fails
//! [`ManifestCommitments::verify_step_out`]. A missing key path yields a zero
//! value digest, so only a claim of "absent" verifies. A
//! [`StepError`] means no valid circuit assignment exists for the witness,
//! which is the usual outcome of decrypting under the wrong key.

pub mod authentication;
pub mod chunk;
pub mod cipher;
pub mod error;
pub mod http;
pub mod json;
pub mod manifest;
pub mod params;
pub mod public_io;
pub mod session;
pub mod step;

pub use authentication::{AuthenticationWitness, PlaintextAuthentication};
pub use chunk::{pad, split_padded, unpad, PaddedChunk};
pub use cipher::{derive_nonce, CipherSuite, NONCE_LEN};
pub use error::{ManifestError, ParamsError, SessionError, StepError, VerificationError};
pub use http::{
    HttpCarry, HttpMachineState, HttpPhase, HttpVerification, HttpWitness, HTTP_STATE_LEN,
};
pub use json::{locate_value, JsonExtraction, JsonParserState, JsonWitness, LocatedValue};
pub use manifest::{Manifest, ManifestBody, ManifestCommitments, ManifestResponse};
pub use params::{CircuitParams, PUBLIC_IO_VARIABLES};
pub use public_io::{
    slot_name, PublicIo, BODY_LENGTH, CIPHERTEXT_CARRY, GLOBAL_DIGEST, HEADERS_DIGEST,
    HTTP_LENGTH, HTTP_MACHINE_STATE, JSON_LENGTH, JSON_STATE, PLAINTEXT_LENGTH,
    SEQUENCE_DIGEST_HASH, UNMATCHED_STATEMENTS,
};
pub use session::{Session, SessionTrace, StepKind, TlsRecord, TraceEntry};
pub use step::{Step, StepOutput};

// Re-export commonly used types
pub use commit::KeyPathElement;
pub use field::Fr;
