//! Setup-time circuit parameters.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;

/// Width of the public accumulator shared by every step kind.
pub const PUBLIC_IO_VARIABLES: usize = 11;

/// Chunk sizes must cover whole keystream blocks for every cipher suite.
pub const CHUNK_ALIGNMENT: usize = 64;

/// The HTTP machine tracks matched lines in a 64-bit mask, one bit of which
/// is the start line.
pub const MAX_NUMBER_OF_HEADERS: usize = 63;

/// Sizes fixed when the step circuits are built.
///
/// Proving and verifying a chain with different parameters is a setup error;
/// every witness is checked against these sizes before a step runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitParams {
    /// Bytes consumed by one authentication, HTTP or JSON step.
    pub data_bytes: usize,
    /// Deepest JSON nesting the extraction step can track.
    pub max_stack_height: usize,
    /// Headers that can be declared in a manifest, not counting the start line.
    pub max_number_of_headers: usize,
}

impl Default for CircuitParams {
    fn default() -> Self {
        Self {
            data_bytes: 512,
            max_stack_height: 5,
            max_number_of_headers: 25,
        }
    }
}

impl CircuitParams {
    pub fn new(
        data_bytes: usize,
        max_stack_height: usize,
        max_number_of_headers: usize,
    ) -> Result<Self, ParamsError> {
        let params = Self {
            data_bytes,
            max_stack_height,
            max_number_of_headers,
        };
        params.validate()?;
        Ok(params)
    }

    /// Loads parameters from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ParamsError> {
        let params: Self =
            serde_json::from_str(json).map_err(|e| ParamsError::Json(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.data_bytes == 0 || self.data_bytes % CHUNK_ALIGNMENT != 0 {
            return Err(ParamsError::DataBytesAlignment(self.data_bytes));
        }
        if self.max_stack_height == 0 {
            return Err(ParamsError::ZeroStackHeight);
        }
        if self.max_number_of_headers > MAX_NUMBER_OF_HEADERS {
            return Err(ParamsError::TooManyHeaders(self.max_number_of_headers));
        }
        Ok(())
    }

    /// Length of the serialized JSON parser state.
    pub fn json_state_len(&self) -> usize {
        4 * self.max_stack_height + 4
    }

    /// Length of the `main_digests` witness: the start line plus headers.
    pub fn main_digests_len(&self) -> usize {
        self.max_number_of_headers + 1
    }
}
