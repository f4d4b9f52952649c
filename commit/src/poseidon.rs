//! Poseidon over the BN254 scalar field, compatible with circomlib.
//!
//! One permutation is instantiated per state width `t = n + 1` for
//! `n` in `1..=16` absorbed inputs. The state starts as `[0, inputs...]`
//! and the digest is the first element after the permutation.
//!
//! Each width has its own round constants and MDS matrix, generated on first
//! use from the Grain LFSR and cached for the life of the process. A width
//! is never reused for another arity: hashing two elements with the
//! three-input instance gives a different (and wrong) digest.

use std::sync::OnceLock;

use field::Fr;
use p3_field::Field;
use p3_symmetric::{
    CompressionFunctionFromHasher, CryptographicHasher, CryptographicPermutation, Permutation,
    PseudoCompressionFunction,
};

use crate::constants::{FULL_ROUNDS, MAX_POSEIDON_INPUTS, PARTIAL_ROUNDS};
use crate::errors::CommitError;
use crate::grain::GrainLfsr;

/// Round constants and MDS matrix for one state width.
#[derive(Debug)]
pub(crate) struct PoseidonConstants {
    partial_rounds: usize,
    /// `(FULL_ROUNDS + partial_rounds) * width` constants, round-major.
    round_constants: Vec<Fr>,
    mds: Vec<Vec<Fr>>,
}

impl PoseidonConstants {
    fn generate(width: usize) -> Self {
        let partial_rounds = PARTIAL_ROUNDS[width - 2];
        let mut lfsr = GrainLfsr::new(width, FULL_ROUNDS, partial_rounds);

        let round_constants = (0..(FULL_ROUNDS + partial_rounds) * width)
            .map(|_| lfsr.next_field_element())
            .collect();
        let mds = cauchy_mds(&mut lfsr, width);

        Self {
            partial_rounds,
            round_constants,
            mds,
        }
    }
}

/// Cauchy matrix `M[i][j] = 1 / (x_i + y_j)` over points drawn from the LFSR.
fn cauchy_mds(lfsr: &mut GrainLfsr, width: usize) -> Vec<Vec<Fr>> {
    loop {
        let points: Vec<Fr> = (0..2 * width)
            .map(|_| lfsr.next_field_element_reduced())
            .collect();
        let (xs, ys) = points.split_at(width);

        let distinct = |values: &[Fr]| {
            values
                .iter()
                .enumerate()
                .all(|(i, a)| values[i + 1..].iter().all(|b| a != b))
        };
        if !distinct(xs) || !distinct(ys) {
            continue;
        }

        let matrix: Option<Vec<Vec<Fr>>> = xs
            .iter()
            .map(|&x| ys.iter().map(|&y| (x + y).try_inverse()).collect())
            .collect();
        if let Some(matrix) = matrix {
            return matrix;
        }
    }
}

static CONSTANTS: [OnceLock<PoseidonConstants>; MAX_POSEIDON_INPUTS] =
    [const { OnceLock::new() }; MAX_POSEIDON_INPUTS];

fn constants_for(width: usize) -> &'static PoseidonConstants {
    CONSTANTS[width - 2].get_or_init(|| PoseidonConstants::generate(width))
}

#[inline(always)]
fn sbox(x: Fr) -> Fr {
    let x2 = x * x;
    x2 * x2 * x
}

/// The Poseidon permutation on a state of `WIDTH` elements.
///
/// `WIDTH` must lie in `2..=17`; other widths fail to compile when
/// instantiated.
#[derive(Clone, Debug)]
pub struct PoseidonPermutation<const WIDTH: usize> {
    constants: &'static PoseidonConstants,
}

impl<const WIDTH: usize> PoseidonPermutation<WIDTH> {
    const SUPPORTED: () = assert!(
        WIDTH >= 2 && WIDTH <= MAX_POSEIDON_INPUTS + 1,
        "poseidon width must be in 2..=17"
    );

    pub fn new() -> Self {
        let () = Self::SUPPORTED;
        Self {
            constants: constants_for(WIDTH),
        }
    }
}

impl<const WIDTH: usize> Default for PoseidonPermutation<WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const WIDTH: usize> Permutation<[Fr; WIDTH]> for PoseidonPermutation<WIDTH> {
    fn permute(&self, mut input: [Fr; WIDTH]) -> [Fr; WIDTH] {
        self.permute_mut(&mut input);
        input
    }

    fn permute_mut(&self, state: &mut [Fr; WIDTH]) {
        let half_full = FULL_ROUNDS / 2;
        let partial = self.constants.partial_rounds;

        for (round, constants) in self
            .constants
            .round_constants
            .chunks_exact(WIDTH)
            .enumerate()
        {
            for (s, c) in state.iter_mut().zip(constants) {
                *s += *c;
            }

            if round < half_full || round >= half_full + partial {
                for s in state.iter_mut() {
                    *s = sbox(*s);
                }
            } else {
                state[0] = sbox(state[0]);
            }

            let previous = *state;
            for (s, row) in state.iter_mut().zip(&self.constants.mds) {
                *s = previous.iter().zip(row).map(|(a, m)| *a * *m).sum();
            }
        }
    }
}

impl<const WIDTH: usize> CryptographicPermutation<[Fr; WIDTH]> for PoseidonPermutation<WIDTH> {}

/// Fixed-arity Poseidon hash absorbing `WIDTH - 1` elements.
///
/// Missing inputs are treated as zero; callers go through
/// [`poseidon_hash`] which always supplies exactly `WIDTH - 1`.
#[derive(Clone, Debug, Default)]
pub struct PoseidonHasher<const WIDTH: usize> {
    permutation: PoseidonPermutation<WIDTH>,
}

impl<const WIDTH: usize> PoseidonHasher<WIDTH> {
    pub fn new() -> Self {
        Self {
            permutation: PoseidonPermutation::new(),
        }
    }
}

impl<const WIDTH: usize> CryptographicHasher<Fr, [Fr; 1]> for PoseidonHasher<WIDTH> {
    fn hash_iter<I>(&self, input: I) -> [Fr; 1]
    where
        I: IntoIterator<Item = Fr>,
    {
        let mut state = [Fr::ZERO; WIDTH];
        let mut input = input.into_iter();
        for (slot, value) in state[1..].iter_mut().zip(input.by_ref()) {
            *slot = value;
        }
        debug_assert!(input.next().is_none(), "too many inputs for width {WIDTH}");
        [self.permutation.permute(state)[0]]
    }
}

/// Two-to-one compression built from the two-input hasher.
pub type PoseidonCompression = CompressionFunctionFromHasher<PoseidonHasher<3>, 2, 1>;

/// Returns the compression function used to chain digests.
pub fn poseidon_compression() -> PoseidonCompression {
    CompressionFunctionFromHasher::new(PoseidonHasher::<3>::new())
}

fn hash_fixed<const WIDTH: usize>(inputs: &[Fr]) -> Fr {
    PoseidonHasher::<WIDTH>::new().hash_slice(inputs)[0]
}

/// Hashes 1 to 16 field elements with the width-matched Poseidon instance.
///
/// # Errors
///
/// Returns [`CommitError::UnsupportedArity`] for an empty input or more than
/// sixteen elements.
pub fn poseidon_hash(inputs: &[Fr]) -> Result<Fr, CommitError> {
    macro_rules! dispatch {
        ($($arity:literal => $width:literal),* $(,)?) => {
            match inputs.len() {
                $($arity => Ok(hash_fixed::<$width>(inputs)),)*
                n => Err(CommitError::UnsupportedArity(n)),
            }
        };
    }

    dispatch!(
        1 => 2, 2 => 3, 3 => 4, 4 => 5, 5 => 6, 6 => 7, 7 => 8, 8 => 9,
        9 => 10, 10 => 11, 11 => 12, 12 => 13, 13 => 14, 14 => 15, 15 => 16, 16 => 17,
    )
}

/// Poseidon of a single element, used to commit to header and path digests.
pub fn hash_one(value: Fr) -> Fr {
    PoseidonHasher::<2>::new().hash_item(value)[0]
}

/// Poseidon of two elements, used to chain running digests.
pub fn hash_two(left: Fr, right: Fr) -> Fr {
    poseidon_compression().compress([[left], [right]])[0]
}
