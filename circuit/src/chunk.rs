//! Fixed-size chunks with trailing padding.

use field::Fr;

use crate::error::StepError;

/// A chunk as fed to a step: real bytes followed by `None` padding.
pub type PaddedChunk = Vec<Option<u8>>;

/// Number of real bytes in `chunk`, checking that padding only forms a suffix.
pub fn real_len(chunk: &[Option<u8>]) -> Result<usize, StepError> {
    let len = chunk.iter().take_while(|b| b.is_some()).count();
    match chunk[len..].iter().position(Option::is_some) {
        Some(pos) => Err(StepError::InteriorPadding(len + pos - 1)),
        None => Ok(len),
    }
}

/// Checks that a chunk has exactly `data_bytes` positions and returns its real length.
pub fn check_chunk(chunk: &[Option<u8>], data_bytes: usize) -> Result<usize, StepError> {
    if chunk.len() != data_bytes {
        return Err(StepError::ParameterMismatch {
            what: "data chunk",
            expected: data_bytes,
            actual: chunk.len(),
        });
    }
    real_len(chunk)
}

/// Pads `bytes` with `None` up to `len` positions.
pub fn pad(bytes: &[u8], len: usize) -> PaddedChunk {
    let mut out: PaddedChunk = bytes.iter().copied().map(Some).collect();
    out.resize(len.max(bytes.len()), None);
    out
}

/// Splits a stream into padded chunks of `data_bytes`. An empty stream yields no chunks.
pub fn split_padded(bytes: &[u8], data_bytes: usize) -> Vec<PaddedChunk> {
    bytes
        .chunks(data_bytes)
        .map(|chunk| pad(chunk, data_bytes))
        .collect()
}

/// Real bytes of a padded chunk.
pub fn unpad(chunk: &[Option<u8>]) -> Vec<u8> {
    chunk.iter().map_while(|b| *b).collect()
}

/// Converts a small field element back to an integer.
pub(crate) fn small_int(value: Fr) -> Option<u64> {
    match value.to_canonical_limbs() {
        [low, 0, 0, 0] => Some(low),
        _ => None,
    }
}
