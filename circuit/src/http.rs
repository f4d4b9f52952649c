//! HTTP response verification.
//!
//! A byte-level state machine walks the plaintext of an HTTP/1.x response.
//! Every start line and header line is committed to as a polynomial digest
//! (line terminator excluded) and, at its CRLF, compared against the
//! manifest's `main_digests`. Matches are folded into [`HEADERS_DIGEST`] and
//! tick down [`UNMATCHED_STATEMENTS`]. Each declared entry can be matched at
//! most once, so a repeated header line only counts the first time. Once the blank line is seen every
//! further byte is body: the step swaps the plaintext commitment in
//! [`GLOBAL_DIGEST`] for a commitment to the body alone.
//!
//! The machine state is serialized to [`HTTP_STATE_LEN`] field elements and
//! committed to in [`HTTP_MACHINE_STATE`], so a chunk can only resume from
//! the state the previous chunk ended in.

use commit::{hash_one, polynomial_digest_elements, polynomial_digest_with_counter};
use field::Fr;
use p3_field::PrimeCharacteristicRing;
use tracing::{debug, trace};

use crate::chunk::{check_chunk, small_int, PaddedChunk};
use crate::error::StepError;
use crate::params::CircuitParams;
use crate::public_io::{
    PublicIo, BODY_LENGTH, GLOBAL_DIGEST, HEADERS_DIGEST, HTTP_LENGTH, HTTP_MACHINE_STATE,
    UNMATCHED_STATEMENTS,
};
use crate::step::{Step, StepOutput};

/// Field elements in a serialized HTTP machine state.
pub const HTTP_STATE_LEN: usize = 7;

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const SP: u8 = b' ';
const HTAB: u8 = b'\t';

const VERSION_PREFIX: &[u8] = b"HTTP/";
const STATUS_DIGITS: u64 = 3;

/// Parsing phase. The discriminants are the serialized values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HttpPhase {
    #[default]
    AwaitStartLine = 0,
    InStartLine = 1,
    AwaitHeaderOrCrlf = 2,
    InHeaderName = 3,
    InHeaderValue = 4,
    InBody = 5,
}

impl HttpPhase {
    fn from_u64(value: u64) -> Option<Self> {
        Some(match value {
            0 => HttpPhase::AwaitStartLine,
            1 => HttpPhase::InStartLine,
            2 => HttpPhase::AwaitHeaderOrCrlf,
            3 => HttpPhase::InHeaderName,
            4 => HttpPhase::InHeaderValue,
            5 => HttpPhase::InBody,
            _ => return None,
        })
    }
}

/// Part of the start line being read.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum StartLinePart {
    #[default]
    Version = 0,
    Status = 1,
    Reason = 2,
}

impl StartLinePart {
    fn from_u64(value: u64) -> Option<Self> {
        Some(match value {
            0 => StartLinePart::Version,
            1 => StartLinePart::Status,
            2 => StartLinePart::Reason,
            _ => return None,
        })
    }
}

/// Something the machine produced for one byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HttpEvent {
    /// A start line or header line ended; carries its digest.
    LineComplete(Fr),
    /// A byte of the body.
    Body(u8),
}

/// Resumable HTTP parser state.
///
/// All line fields are zero outside a line and the match mask is cleared when
/// the body starts, so the initial state and the terminal state (`InBody`)
/// serialize to a single non-zero element at most.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct HttpMachineState {
    pub phase: HttpPhase,
    pub start_line_part: StartLinePart,
    /// A CR was read and the matching LF has not been seen yet.
    pub pending_cr: bool,
    /// `x^k` where `k` is the number of bytes digested in the current line.
    pub line_monomial: Fr,
    pub line_digest: Fr,
    /// Length of the current version, status or header name token.
    pub token_len: u64,
    /// Bit `i` is set once `main_digests[i]` has been matched.
    pub matched_lines: u64,
}

impl HttpMachineState {
    /// The state after a complete header block: every further byte is body.
    pub fn in_body() -> Self {
        Self {
            phase: HttpPhase::InBody,
            ..Self::default()
        }
    }

    pub fn to_fields(&self) -> [Fr; HTTP_STATE_LEN] {
        [
            Fr::from_canonical_u64(self.phase as u64),
            Fr::from_canonical_u64(self.start_line_part as u64),
            Fr::from(self.pending_cr),
            self.line_monomial,
            self.line_digest,
            Fr::from_canonical_u64(self.token_len),
            Fr::from_canonical_u64(self.matched_lines),
        ]
    }

    pub fn from_fields(fields: &[Fr]) -> Result<Self, StepError> {
        let [phase, part, pending_cr, line_monomial, line_digest, token_len, matched_lines] =
            fields
        else {
            return Err(StepError::ParameterMismatch {
                what: "HTTP machine state",
                expected: HTTP_STATE_LEN,
                actual: fields.len(),
            });
        };
        let invalid = || StepError::InvalidState("HTTP machine state");

        Ok(Self {
            phase: small_int(*phase)
                .and_then(HttpPhase::from_u64)
                .ok_or_else(invalid)?,
            start_line_part: small_int(*part)
                .and_then(StartLinePart::from_u64)
                .ok_or_else(invalid)?,
            pending_cr: match small_int(*pending_cr) {
                Some(0) => false,
                Some(1) => true,
                _ => return Err(invalid()),
            },
            line_monomial: *line_monomial,
            line_digest: *line_digest,
            token_len: small_int(*token_len).ok_or_else(invalid)?,
            matched_lines: small_int(*matched_lines).ok_or_else(invalid)?,
        })
    }

    /// Commitment stored in [`HTTP_MACHINE_STATE`].
    pub fn digest(&self, x: Fr) -> Fr {
        polynomial_digest_elements(&self.to_fields(), x)
    }

    pub fn is_terminal(&self) -> bool {
        *self == Self::in_body()
    }

    /// Marks the first unmatched declared entry equal to `digest`, returning
    /// its index. Zero entries are padding and never match.
    pub fn match_line(&mut self, digest: Fr, main_digests: &[Fr]) -> Option<usize> {
        let index = main_digests.iter().enumerate().position(|(i, d)| {
            i < u64::BITS as usize
                && *d != Fr::ZERO
                && *d == digest
                && self.matched_lines & (1 << i) == 0
        })?;
        self.matched_lines |= 1 << index;
        Some(index)
    }

    fn begin_line(&mut self, phase: HttpPhase) {
        self.phase = phase;
        self.start_line_part = StartLinePart::Version;
        self.line_monomial = Fr::ONE;
        self.line_digest = Fr::ZERO;
        self.token_len = 0;
    }

    fn end_line(&mut self) -> Fr {
        let digest = self.line_digest;
        self.phase = HttpPhase::AwaitHeaderOrCrlf;
        self.start_line_part = StartLinePart::Version;
        self.line_monomial = Fr::ZERO;
        self.line_digest = Fr::ZERO;
        self.token_len = 0;
        digest
    }

    fn absorb(&mut self, byte: u8, x: Fr) {
        self.line_digest += Fr::from(byte) * self.line_monomial;
        self.line_monomial *= x;
    }

    /// Consumes one byte. `offset` is only used for error reporting.
    pub fn advance(
        &mut self,
        byte: u8,
        x: Fr,
        offset: usize,
    ) -> Result<Option<HttpEvent>, StepError> {
        let malformed = |reason| StepError::MalformedHttp { offset, reason };

        if self.pending_cr {
            if byte != LF {
                return Err(malformed("CR not followed by LF"));
            }
            self.pending_cr = false;
            return Ok(match self.phase {
                HttpPhase::InStartLine | HttpPhase::InHeaderValue => {
                    Some(HttpEvent::LineComplete(self.end_line()))
                }
                HttpPhase::AwaitHeaderOrCrlf => {
                    *self = Self::in_body();
                    None
                }
                _ => return Err(StepError::InvalidState("HTTP machine state")),
            });
        }

        match self.phase {
            HttpPhase::AwaitStartLine => {
                if matches!(byte, CR | LF | SP | HTAB) {
                    return Err(malformed("response must begin with the HTTP version"));
                }
                self.begin_line(HttpPhase::InStartLine);
                self.start_line_byte(byte, x, offset)?;
            }
            HttpPhase::InStartLine => self.start_line_byte(byte, x, offset)?,
            HttpPhase::AwaitHeaderOrCrlf => match byte {
                CR => self.pending_cr = true,
                LF => return Err(malformed("bare LF")),
                SP | HTAB => return Err(malformed("obsolete header line folding")),
                _ => {
                    self.begin_line(HttpPhase::InHeaderName);
                    self.header_name_byte(byte, x, offset)?;
                }
            },
            HttpPhase::InHeaderName => self.header_name_byte(byte, x, offset)?,
            HttpPhase::InHeaderValue => match byte {
                CR => self.pending_cr = true,
                LF => return Err(malformed("bare LF")),
                _ => self.absorb(byte, x),
            },
            HttpPhase::InBody => return Ok(Some(HttpEvent::Body(byte))),
        }
        Ok(None)
    }

    fn start_line_byte(&mut self, byte: u8, x: Fr, offset: usize) -> Result<(), StepError> {
        let malformed = |reason| StepError::MalformedHttp { offset, reason };

        if byte == LF {
            return Err(malformed("bare LF"));
        }
        if byte == CR {
            if self.start_line_part != StartLinePart::Reason {
                return Err(malformed("start line ended before the reason phrase"));
            }
            self.pending_cr = true;
            return Ok(());
        }

        match self.start_line_part {
            StartLinePart::Version => {
                if byte == SP {
                    if self.token_len <= VERSION_PREFIX.len() as u64 {
                        return Err(malformed("truncated HTTP version"));
                    }
                    self.start_line_part = StartLinePart::Status;
                    self.token_len = 0;
                } else {
                    let expected = VERSION_PREFIX.get(self.token_len as usize);
                    if expected.is_some_and(|&e| e != byte) {
                        return Err(malformed("version must start with HTTP/"));
                    }
                    self.token_len += 1;
                }
            }
            StartLinePart::Status => {
                if byte == SP {
                    if self.token_len != STATUS_DIGITS {
                        return Err(malformed("status code must have three digits"));
                    }
                    self.start_line_part = StartLinePart::Reason;
                    self.token_len = 0;
                } else if byte.is_ascii_digit() && self.token_len < STATUS_DIGITS {
                    self.token_len += 1;
                } else {
                    return Err(malformed("status code must have three digits"));
                }
            }
            StartLinePart::Reason => {}
        }

        self.absorb(byte, x);
        Ok(())
    }

    fn header_name_byte(&mut self, byte: u8, x: Fr, offset: usize) -> Result<(), StepError> {
        let malformed = |reason| StepError::MalformedHttp { offset, reason };

        match byte {
            b':' => {
                if self.token_len == 0 {
                    return Err(malformed("empty header name"));
                }
                self.phase = HttpPhase::InHeaderValue;
                self.token_len = 0;
                self.absorb(byte, x);
            }
            CR | LF => return Err(malformed("header line without a colon")),
            SP | HTAB => return Err(malformed("whitespace in header name")),
            // Header names are case-insensitive; digest them lowercased.
            _ => {
                self.token_len += 1;
                self.absorb(byte.to_ascii_lowercase(), x);
            }
        }
        Ok(())
    }
}

/// Private inputs of one HTTP step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpWitness {
    /// `data_bytes` positions of plaintext, padded at the end.
    pub data: PaddedChunk,
    pub ciphertext_digest: Fr,
    /// Serialized state the previous chunk ended in.
    pub machine_state: [Fr; HTTP_STATE_LEN],
    /// Digests of the declared start line and header lines, zero for unused slots.
    pub main_digests: Vec<Fr>,
}

/// What the next HTTP chunk needs, plus the body bytes for the JSON step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpCarry {
    pub machine_state: [Fr; HTTP_STATE_LEN],
    pub body: Vec<u8>,
}

/// Verifies one chunk of an HTTP response.
#[derive(Clone, Debug)]
pub struct HttpVerification {
    params: CircuitParams,
}

impl HttpVerification {
    pub fn new(params: CircuitParams) -> Self {
        Self { params }
    }
}

impl Step for HttpVerification {
    type Witness = HttpWitness;
    type Carry = HttpCarry;

    fn step(
        &self,
        step_in: &PublicIo,
        witness: &HttpWitness,
    ) -> Result<StepOutput<HttpCarry>, StepError> {
        let real = check_chunk(&witness.data, self.params.data_bytes)?;
        if witness.main_digests.len() != self.params.main_digests_len() {
            return Err(StepError::ParameterMismatch {
                what: "main_digests",
                expected: self.params.main_digests_len(),
                actual: witness.main_digests.len(),
            });
        }

        let x = witness.ciphertext_digest;
        let mut state = HttpMachineState::from_fields(&witness.machine_state)?;
        if state.digest(x) != step_in[HTTP_MACHINE_STATE] {
            return Err(StepError::MachineStateMismatch);
        }

        let mut matched = 0u64;
        let mut headers_digest = Fr::ZERO;
        let mut body = Vec::new();
        let mut body_digest = Fr::ZERO;
        let mut body_monomial = step_in[BODY_LENGTH];

        for (offset, byte) in witness.data[..real].iter().flatten().enumerate() {
            match state.advance(*byte, x, offset)? {
                Some(HttpEvent::LineComplete(digest)) => {
                    if let Some(index) = state.match_line(digest, &witness.main_digests) {
                        trace!("matched declared line {} at offset {}", index, offset);
                        matched += 1;
                        headers_digest += hash_one(digest);
                    }
                }
                Some(HttpEvent::Body(b)) => {
                    body_digest += Fr::from(b) * body_monomial;
                    body_monomial *= x;
                    body.push(b);
                }
                None => {}
            }
        }

        let data_digest = polynomial_digest_with_counter(&witness.data, x, step_in[HTTP_LENGTH]);

        let mut step_out = *step_in;
        step_out[GLOBAL_DIGEST] = step_in[GLOBAL_DIGEST] - data_digest + body_digest;
        step_out[HTTP_LENGTH] = step_in[HTTP_LENGTH] * x.exp_u64(real as u64);
        step_out[HTTP_MACHINE_STATE] = state.digest(x);
        step_out[HEADERS_DIGEST] = step_in[HEADERS_DIGEST] + headers_digest;
        step_out[UNMATCHED_STATEMENTS] =
            step_in[UNMATCHED_STATEMENTS] - Fr::from_canonical_u64(matched);
        step_out[BODY_LENGTH] = body_monomial;

        debug!(
            "parsed {} HTTP bytes: {} lines matched, {} body bytes, phase {:?}",
            real,
            matched,
            body.len(),
            state.phase
        );

        Ok(StepOutput {
            step_out,
            carry: HttpCarry {
                machine_state: state.to_fields(),
                body,
            },
        })
    }
}
