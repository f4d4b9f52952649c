//! Grain LFSR used to derive Poseidon round constants and MDS matrices.
//!
//! The generator is seeded with an 80-bit description of the instance
//! (field type, S-box, field size, width, round counts) followed by thirty
//! ones, warmed up for 160 clocks, and then emits bits through the
//! self-shrinking rule: clock a pair, output the second bit if the first
//! one is set, otherwise discard both.

use field::Fr;
use p3_field::PrimeCharacteristicRing;

use crate::constants::FIELD_BITS;

const STATE_BITS: u32 = 80;
const WARMUP_CLOCKS: usize = 160;

/// Feedback taps, counted from the oldest bit.
const TAPS: [u32; 6] = [62, 51, 38, 23, 13, 0];

/// An 80-bit Grain LFSR. Bit `i` of `state` is the `i`-th oldest bit.
#[derive(Clone, Debug)]
pub(crate) struct GrainLfsr {
    state: u128,
}

impl GrainLfsr {
    /// Seeds the generator for a prime-field, x^5 instance of the given width.
    pub(crate) fn new(width: usize, full_rounds: usize, partial_rounds: usize) -> Self {
        let fields: [(u32, u128); 7] = [
            (2, 1),                          // prime field
            (4, 0),                          // x^alpha S-box
            (12, FIELD_BITS as u128),        // field size
            (12, width as u128),             // t
            (10, full_rounds as u128),       // R_F
            (10, partial_rounds as u128),    // R_P
            (30, (1u128 << 30) - 1),         // padding
        ];

        let mut state = 0u128;
        let mut position = 0u32;
        for (len, value) in fields {
            // Most significant bit first.
            for i in (0..len).rev() {
                state |= ((value >> i) & 1) << position;
                position += 1;
            }
        }
        debug_assert_eq!(position, STATE_BITS);

        let mut lfsr = Self { state };
        for _ in 0..WARMUP_CLOCKS {
            lfsr.clock();
        }
        lfsr
    }

    #[inline]
    fn clock(&mut self) -> bool {
        let bit = TAPS
            .iter()
            .fold(0u128, |acc, &tap| acc ^ ((self.state >> tap) & 1));
        self.state = (self.state >> 1) | (bit << (STATE_BITS - 1));
        bit == 1
    }

    fn next_bit(&mut self) -> bool {
        loop {
            let select = self.clock();
            let bit = self.clock();
            if select {
                return bit;
            }
        }
    }

    /// Reads `FIELD_BITS` output bits as a big-endian integer.
    fn next_limbs(&mut self) -> [u64; 4] {
        let mut limbs = [0u64; 4];
        for _ in 0..FIELD_BITS {
            let mut carry = self.next_bit() as u64;
            for limb in limbs.iter_mut() {
                let next_carry = *limb >> 63;
                *limb = (*limb << 1) | carry;
                carry = next_carry;
            }
        }
        limbs
    }

    /// Next field element by rejection sampling, as used for round constants.
    pub(crate) fn next_field_element(&mut self) -> Fr {
        loop {
            if let Some(value) = Fr::from_limbs_checked(self.next_limbs()) {
                return value;
            }
        }
    }

    /// Next field element reduced modulo p, as used for the MDS points.
    pub(crate) fn next_field_element_reduced(&mut self) -> Fr {
        let limbs = self.next_limbs();
        let low = Fr::from_canonical_limbs([limbs[0], limbs[1], limbs[2], 0]);
        let shift = Fr::from_canonical_u128(1u128 << 96);
        low + Fr::from_canonical_u64(limbs[3]) * shift.square()
    }
}
