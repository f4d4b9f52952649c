//! The interface shared by all folding steps.

use crate::error::StepError;
use crate::public_io::PublicIo;

/// Result of one step: the public accumulator for the next step and the
/// private carry the witness generator needs for the following chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepOutput<C> {
    pub step_out: PublicIo,
    pub carry: C,
}

/// A step function `(step_in, witness) -> step_out`.
///
/// Steps are pure: the same input always produces the same output, and all
/// state that survives a chunk boundary is either in the accumulator or in
/// the carry.
pub trait Step {
    type Witness;
    type Carry;

    fn step(
        &self,
        step_in: &PublicIo,
        witness: &Self::Witness,
    ) -> Result<StepOutput<Self::Carry>, StepError>;
}
