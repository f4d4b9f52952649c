//! JSON value extraction.
//!
//! A streaming tokenizer keeps a fixed arena of `max_stack_height` frames,
//! one per open container. Object keys are digested into their frame's key
//! hash and primitive values into its value hash. Whenever a primitive value
//! inside a container completes, the frame arena is folded with
//! [`compress_tree_hash`]; if that equals the committed sequence digest and
//! the value hash equals the committed value digest, the step counts a match.
//!
//! The step removes the body commitment from [`GLOBAL_DIGEST`] chunk by chunk
//! and adds `value_digest` once per match, so a chain over the whole body
//! leaves exactly the extracted value's digest in the ledger.

use commit::{
    compress_tree_hash, hash_one, polynomial_digest_elements, polynomial_digest_with_counter,
    StackEntry, KIND_ARRAY, KIND_NONE, KIND_OBJECT,
};
use field::Fr;
use p3_field::PrimeCharacteristicRing;
use tracing::{debug, trace};

use crate::chunk::{check_chunk, small_int, PaddedChunk};
use crate::error::StepError;
use crate::params::CircuitParams;
use crate::public_io::{PublicIo, GLOBAL_DIGEST, JSON_LENGTH, JSON_STATE, SEQUENCE_DIGEST_HASH};
use crate::step::{Step, StepOutput};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    #[default]
    None,
    Object,
    Array,
}

impl ContainerKind {
    fn to_u64(self) -> u64 {
        match self {
            ContainerKind::None => KIND_NONE,
            ContainerKind::Object => KIND_OBJECT,
            ContainerKind::Array => KIND_ARRAY,
        }
    }

    fn from_u64(value: u64) -> Option<Self> {
        match value {
            KIND_NONE => Some(ContainerKind::None),
            KIND_OBJECT => Some(ContainerKind::Object),
            KIND_ARRAY => Some(ContainerKind::Array),
            _ => None,
        }
    }
}

/// One open container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Frame {
    pub kind: ContainerKind,
    /// Objects: `0` while reading a key, `1` in value position. Arrays: element index.
    pub aux: u64,
    pub key_hash: Fr,
    pub value_hash: Fr,
}

impl Frame {
    fn open(kind: ContainerKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    fn in_key_position(&self) -> bool {
        self.kind == ContainerKind::Object && self.aux == 0
    }

    fn stack_entry(&self) -> StackEntry {
        StackEntry {
            kind: Fr::from_canonical_u64(self.kind.to_u64()),
            aux: Fr::from_canonical_u64(self.aux),
            key_hash: self.key_hash,
        }
    }
}

/// String tokenizer state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum StringState {
    #[default]
    Outside = 0,
    Inside = 1,
    Escape = 2,
}

impl StringState {
    fn from_u64(value: u64) -> Option<Self> {
        Some(match value {
            0 => StringState::Outside,
            1 => StringState::Inside,
            2 => StringState::Escape,
            _ => return None,
        })
    }
}

/// Something the parser produced for one byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JsonEvent {
    /// A byte was folded into a primitive value hash.
    ValueByte(u8),
    /// A primitive value inside a container ended.
    ValueCompleted { path_digest: Fr, value_hash: Fr },
}

/// Resumable JSON parser state.
///
/// Frames above the current depth are always empty, and every token field is
/// reset when the root container closes, so a finished document leaves the
/// all-zero state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JsonParserState {
    frames: Vec<Frame>,
    /// `x^k` where `k` is the number of bytes in the current key or value.
    pub monomial: Fr,
    pub string: StringState,
    pub scalar: bool,
    /// The top frame's current key or value has been fully read.
    pub value_complete: bool,
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_scalar_start(byte: u8) -> bool {
    byte.is_ascii_digit() || matches!(byte, b'-' | b't' | b'f' | b'n')
}

fn is_scalar_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'+' | b'.')
}

impl JsonParserState {
    /// An empty stack at the root.
    pub fn new(max_stack_height: usize) -> Self {
        Self {
            frames: vec![Frame::default(); max_stack_height],
            monomial: Fr::ZERO,
            string: StringState::Outside,
            scalar: false,
            value_complete: false,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames
            .iter()
            .take_while(|f| f.kind != ContainerKind::None)
            .count()
    }

    pub fn is_root(&self) -> bool {
        *self == Self::new(self.frames.len())
    }

    /// Serializes as `[kind, aux]` per frame, then `[key_hash, value_hash]`
    /// per frame, then the token fields.
    pub fn to_fields(&self) -> Vec<Fr> {
        let mut out = Vec::with_capacity(4 * self.frames.len() + 4);
        for frame in &self.frames {
            out.push(Fr::from_canonical_u64(frame.kind.to_u64()));
            out.push(Fr::from_canonical_u64(frame.aux));
        }
        for frame in &self.frames {
            out.push(frame.key_hash);
            out.push(frame.value_hash);
        }
        out.extend([
            self.monomial,
            Fr::from_canonical_u64(self.string as u64),
            Fr::from(self.scalar),
            Fr::from(self.value_complete),
        ]);
        out
    }

    pub fn from_fields(fields: &[Fr], max_stack_height: usize) -> Result<Self, StepError> {
        let expected = 4 * max_stack_height + 4;
        if fields.len() != expected {
            return Err(StepError::ParameterMismatch {
                what: "JSON parser state",
                expected,
                actual: fields.len(),
            });
        }
        let invalid = || StepError::InvalidState("JSON parser state");
        let flag = |value: Fr| match small_int(value) {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(invalid()),
        };

        let (structure, rest) = fields.split_at(2 * max_stack_height);
        let (hashes, tail) = rest.split_at(2 * max_stack_height);

        let frames = structure
            .chunks_exact(2)
            .zip(hashes.chunks_exact(2))
            .map(|(s, h)| -> Result<Frame, StepError> {
                Ok(Frame {
                    kind: small_int(s[0])
                        .and_then(ContainerKind::from_u64)
                        .ok_or_else(invalid)?,
                    aux: small_int(s[1]).ok_or_else(invalid)?,
                    key_hash: h[0],
                    value_hash: h[1],
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let state = Self {
            frames,
            monomial: tail[0],
            string: small_int(tail[1])
                .and_then(StringState::from_u64)
                .ok_or_else(invalid)?,
            scalar: flag(tail[2])?,
            value_complete: flag(tail[3])?,
        };

        let depth = state.depth();
        if state.frames[depth..].iter().any(|f| *f != Frame::default()) {
            return Err(invalid());
        }
        Ok(state)
    }

    /// Commitment stored in [`JSON_STATE`].
    pub fn digest(&self, x: Fr) -> Fr {
        polynomial_digest_elements(&self.to_fields(), x)
    }

    /// Folds the frame arena the way a sequence digest is built.
    pub fn path_digest(&self, x: Fr) -> Fr {
        let entries: Vec<StackEntry> = self.frames.iter().map(Frame::stack_entry).collect();
        compress_tree_hash(x, &entries)
    }

    fn top(&self) -> Option<&Frame> {
        self.depth().checked_sub(1).map(|i| &self.frames[i])
    }

    fn top_mut(&mut self) -> Option<&mut Frame> {
        let depth = self.depth();
        depth.checked_sub(1).map(move |i| &mut self.frames[i])
    }

    /// Whether a value may begin here: at the root, after `:` or in an array.
    fn expects_value(&self) -> bool {
        !self.value_complete && !self.top().is_some_and(Frame::in_key_position)
    }

    fn absorb(&mut self, byte: u8, x: Fr) -> Option<JsonEvent> {
        let monomial = self.monomial;
        let frame = self.top_mut()?;
        let term = Fr::from(byte) * monomial;
        let key = frame.in_key_position();
        if key {
            frame.key_hash += term;
        } else {
            frame.value_hash += term;
        }
        self.monomial *= x;
        (!key).then_some(JsonEvent::ValueByte(byte))
    }

    /// Ends the current key or primitive value.
    fn finish_token(&mut self, x: Fr) -> Option<JsonEvent> {
        self.monomial = Fr::ZERO;
        let frame = *self.top()?;
        self.value_complete = true;
        if frame.in_key_position() {
            return None;
        }
        Some(JsonEvent::ValueCompleted {
            path_digest: self.path_digest(x),
            value_hash: frame.value_hash,
        })
    }

    fn begin_token(&mut self) {
        let depth = self.depth();
        if let Some(frame) = self.top_mut() {
            if frame.in_key_position() {
                frame.key_hash = Fr::ZERO;
            } else {
                frame.value_hash = Fr::ZERO;
            }
        }
        if depth > 0 {
            self.monomial = Fr::ONE;
        }
    }

    fn push(&mut self, kind: ContainerKind) -> Result<(), StepError> {
        let depth = self.depth();
        let Some(slot) = self.frames.get_mut(depth) else {
            return Err(StepError::StackOverflow(self.frames.len()));
        };
        *slot = Frame::open(kind);
        self.value_complete = false;
        Ok(())
    }

    fn pop(&mut self) {
        if let Some(frame) = self.top_mut() {
            *frame = Frame::default();
        }
        // A closed container is a complete value of its parent.
        self.value_complete = self.depth() > 0;
    }

    /// Consumes one byte. `offset` is only used for error reporting.
    pub fn advance(
        &mut self,
        byte: u8,
        x: Fr,
        offset: usize,
    ) -> Result<Option<JsonEvent>, StepError> {
        let malformed = |reason| StepError::MalformedJson { offset, reason };

        match self.string {
            StringState::Escape => {
                self.string = StringState::Inside;
                return Ok(self.absorb(byte, x));
            }
            StringState::Inside => {
                return Ok(match byte {
                    b'"' => {
                        self.string = StringState::Outside;
                        self.finish_token(x)
                    }
                    b'\\' => {
                        self.string = StringState::Escape;
                        self.absorb(byte, x)
                    }
                    _ => self.absorb(byte, x),
                });
            }
            StringState::Outside => {}
        }

        if self.scalar {
            if is_scalar_byte(byte) {
                return Ok(self.absorb(byte, x));
            }
            if !is_whitespace(byte) && !matches!(byte, b',' | b']' | b'}') {
                return Err(malformed("invalid character in literal"));
            }
            self.scalar = false;
            let event = self.finish_token(x);
            // The delimiter itself still has to be handled.
            if is_whitespace(byte) {
                return Ok(event);
            }
            self.structural(byte, offset)?;
            return Ok(event);
        }

        if is_whitespace(byte) {
            return Ok(None);
        }

        match byte {
            b'"' => {
                let key = self.top().is_some_and(Frame::in_key_position);
                if self.value_complete || (!key && !self.expects_value()) {
                    return Err(malformed("unexpected string"));
                }
                self.begin_token();
                self.string = StringState::Inside;
                Ok(None)
            }
            b if is_scalar_start(b) => {
                if !self.expects_value() {
                    return Err(malformed("unexpected literal"));
                }
                self.begin_token();
                self.scalar = true;
                Ok(self.absorb(b, x))
            }
            _ => {
                self.structural(byte, offset)?;
                Ok(None)
            }
        }
    }

    fn structural(&mut self, byte: u8, offset: usize) -> Result<(), StepError> {
        let malformed = |reason| StepError::MalformedJson { offset, reason };
        let top = self.top().copied();

        match byte {
            b'{' | b'[' => {
                if !self.expects_value() {
                    return Err(malformed("unexpected container"));
                }
                let kind = if byte == b'{' {
                    ContainerKind::Object
                } else {
                    ContainerKind::Array
                };
                self.push(kind)
            }
            b'}' => match top {
                Some(f) if f.kind == ContainerKind::Object => {
                    if (f.aux == 0 && self.value_complete) || (f.aux == 1 && !self.value_complete) {
                        return Err(malformed("object closed inside a member"));
                    }
                    self.pop();
                    Ok(())
                }
                _ => Err(malformed("unbalanced '}'")),
            },
            b']' => match top {
                Some(f) if f.kind == ContainerKind::Array => {
                    self.pop();
                    Ok(())
                }
                _ => Err(malformed("unbalanced ']'")),
            },
            b':' => {
                let complete = self.value_complete;
                match self.top_mut() {
                    Some(f) if f.in_key_position() && complete => f.aux = 1,
                    _ => return Err(malformed("unexpected ':'")),
                }
                self.value_complete = false;
                Ok(())
            }
            b',' => {
                if !self.value_complete {
                    return Err(malformed("unexpected ','"));
                }
                match self.top_mut() {
                    Some(f) if f.kind == ContainerKind::Object && f.aux == 1 => {
                        f.aux = 0;
                        f.key_hash = Fr::ZERO;
                        f.value_hash = Fr::ZERO;
                    }
                    Some(f) if f.kind == ContainerKind::Array => {
                        f.aux += 1;
                        f.value_hash = Fr::ZERO;
                    }
                    _ => return Err(malformed("unexpected ','")),
                }
                self.value_complete = false;
                Ok(())
            }
            _ => Err(malformed("unexpected character")),
        }
    }
}

/// Private inputs of one JSON step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonWitness {
    /// `data_bytes` positions of body, padded at the end.
    pub data: PaddedChunk,
    pub ciphertext_digest: Fr,
    pub sequence_digest: Fr,
    pub value_digest: Fr,
    /// Serialized state the previous chunk ended in.
    pub state: Vec<Fr>,
}

/// Extracts the committed value from one chunk of a JSON body.
#[derive(Clone, Debug)]
pub struct JsonExtraction {
    params: CircuitParams,
}

impl JsonExtraction {
    pub fn new(params: CircuitParams) -> Self {
        Self { params }
    }
}

impl Step for JsonExtraction {
    type Witness = JsonWitness;
    /// The serialized parser state for the next chunk.
    type Carry = Vec<Fr>;

    fn step(
        &self,
        step_in: &PublicIo,
        witness: &JsonWitness,
    ) -> Result<StepOutput<Vec<Fr>>, StepError> {
        let real = check_chunk(&witness.data, self.params.data_bytes)?;
        let x = witness.ciphertext_digest;

        let mut state =
            JsonParserState::from_fields(&witness.state, self.params.max_stack_height)?;
        if state.digest(x) != step_in[JSON_STATE] {
            return Err(StepError::ParserStateMismatch);
        }
        if hash_one(witness.sequence_digest) != step_in[SEQUENCE_DIGEST_HASH] {
            return Err(StepError::SequenceDigestMismatch);
        }

        let mut matches = 0u64;
        for (offset, byte) in witness.data[..real].iter().flatten().enumerate() {
            if let Some(JsonEvent::ValueCompleted {
                path_digest,
                value_hash,
            }) = state.advance(*byte, x, offset)?
            {
                if path_digest == witness.sequence_digest && value_hash == witness.value_digest {
                    trace!("matched target value at offset {}", offset);
                    matches += 1;
                }
            }
        }

        let data_digest = polynomial_digest_with_counter(&witness.data, x, step_in[JSON_LENGTH]);

        let mut step_out = *step_in;
        step_out[GLOBAL_DIGEST] = step_in[GLOBAL_DIGEST] - data_digest
            + witness.value_digest * Fr::from_canonical_u64(matches);
        step_out[JSON_LENGTH] = step_in[JSON_LENGTH] * x.exp_u64(real as u64);
        step_out[JSON_STATE] = state.digest(x);

        debug!(
            "parsed {} JSON bytes: {} matches, depth {}",
            real,
            matches,
            state.depth()
        );

        Ok(StepOutput {
            step_out,
            carry: state.to_fields(),
        })
    }
}

/// A value found at a key path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocatedValue {
    pub digest: Fr,
    /// Raw bytes of the value, without quotes for strings.
    pub bytes: Vec<u8>,
}

/// Runs the parser over a whole body and returns the first primitive value
/// whose path matches `sequence_digest`.
pub fn locate_value(
    body: &[u8],
    x: Fr,
    sequence_digest: Fr,
    max_stack_height: usize,
) -> Result<Option<LocatedValue>, StepError> {
    let mut state = JsonParserState::new(max_stack_height);
    let mut bytes = Vec::new();
    for (offset, &byte) in body.iter().enumerate() {
        match state.advance(byte, x, offset)? {
            Some(JsonEvent::ValueByte(b)) => bytes.push(b),
            Some(JsonEvent::ValueCompleted {
                path_digest,
                value_hash,
            }) => {
                if path_digest == sequence_digest {
                    return Ok(Some(LocatedValue {
                        digest: value_hash,
                        bytes,
                    }));
                }
                bytes.clear();
            }
            None => {}
        }
    }
    Ok(None)
}
