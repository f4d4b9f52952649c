//! Scalar field of BN254. p = 0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001
//!
//! This implementation uses Montgomery form for efficient modular arithmetic.
//! The field element is represented as [u64; 4] in little-endian order.
//!
//! Every digest, length commitment and accumulator slot of the folding
//! pipeline is an element of this field.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Debug, Display, Formatter};
use core::hash::{Hash, Hasher};
use core::iter::{Product, Sum};
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use core::str::FromStr;
use num_bigint::BigUint;
use p3_field::integers::QuotientMap;
use p3_field::{Field, Packable, PrimeCharacteristicRing, PrimeField, RawDataSerializable};
use rand::distr::{Distribution, StandardUniform};
use rand::Rng;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// BN254 scalar field element.
/// Represented in Montgomery form with [u64; 4]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Fr {
    /// Montgomery form: value * R mod p, where R = 2^256
    limbs: [u64; 4],
}

// Field modulus: p = 0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001
const MODULUS: [u64; 4] = [
    0x43e1f593f0000001,
    0x2833e84879b97091,
    0xb85045b68181585d,
    0x30644e72e131a029,
];

// R = 2^256 mod p (Montgomery parameter)
const R: [u64; 4] = [
    0xac96341c4ffffffb,
    0x36fc76959f60cd29,
    0x666ea36f7879462e,
    0x0e0a77c19a07df2f,
];

// R^2 = 2^512 mod p (for Montgomery conversion)
const R2: [u64; 4] = [
    0x1bb8e645ae216da7,
    0x53fe3ab1e35c59e3,
    0x8c49833d53bb8085,
    0x0216d0b17f4e44a5,
];

// -p^{-1} mod 2^64 (Montgomery parameter mu)
const MU: u64 = 0xc2e1f593efffffff;

/// Mask keeping the low 254 bits of the top limb, the bit length of p.
const TOP_LIMB_MASK: u64 = 0x3fff_ffff_ffff_ffff;

/// Errors produced when parsing a field element from text or bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFrError {
    #[error("field element must be 0x-prefixed hex")]
    MissingPrefix,
    #[error("field element has more than 64 hex digits")]
    TooLong,
    #[error("invalid hex digit in field element")]
    InvalidDigit,
    #[error("value is not reduced modulo the BN254 scalar field")]
    NonCanonical,
}

impl Fr {
    /// Zero element (in Montgomery form)
    pub const ZERO: Self = Fr {
        limbs: [0, 0, 0, 0],
    };

    /// One element (in Montgomery form: R mod p)
    pub const ONE: Self = Fr { limbs: R };

    /// Create a new field element from a u64 value
    #[inline]
    pub fn from_canonical_u64(val: u64) -> Self {
        // Convert to Montgomery form: val * R^2 * R^{-1} = val * R
        let result = Fr {
            limbs: [val, 0, 0, 0],
        };
        montgomery_mul(result, Fr { limbs: R2 })
    }

    /// Create a field element from a u128 value. Every u128 is below p.
    #[inline]
    pub fn from_canonical_u128(val: u128) -> Self {
        Self::from_canonical_limbs([val as u64, (val >> 64) as u64, 0, 0])
    }

    /// Convert from Montgomery form to canonical form
    #[inline]
    pub fn to_canonical_limbs(&self) -> [u64; 4] {
        // Multiply by 1 to get out of Montgomery form
        let one = Fr {
            limbs: [1, 0, 0, 0],
        };
        montgomery_mul(*self, one).limbs
    }

    /// Builds an element from canonical little-endian limbs.
    ///
    /// The limbs must encode a value below p; use [`Fr::from_limbs_checked`]
    /// for untrusted input.
    #[inline]
    pub fn from_canonical_limbs(limbs: [u64; 4]) -> Self {
        montgomery_mul(Fr { limbs }, Fr { limbs: R2 })
    }

    /// Builds an element from little-endian limbs, rejecting values `>= p`.
    pub fn from_limbs_checked(limbs: [u64; 4]) -> Option<Self> {
        is_canonical(limbs).then(|| Self::from_canonical_limbs(limbs))
    }

    /// Canonical little-endian byte encoding.
    pub fn to_bytes_le(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (chunk, limb) in out.chunks_exact_mut(8).zip(self.to_canonical_limbs()) {
            chunk.copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    /// Decodes a canonical little-endian encoding.
    pub fn from_bytes_le(bytes: &[u8; 32]) -> Option<Self> {
        let mut limbs = [0u64; 4];
        for (limb, chunk) in limbs.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            *limb = u64::from_le_bytes(word);
        }
        Self::from_limbs_checked(limbs)
    }

    /// Parses a `0x`-prefixed big-endian hex string.
    pub fn from_hex(s: &str) -> Result<Self, ParseFrError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(ParseFrError::MissingPrefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseFrError::InvalidDigit);
        }
        if digits.len() > 64 {
            return Err(ParseFrError::TooLong);
        }

        let mut limbs = [0u64; 4];
        let mut end = digits.len();
        for limb in limbs.iter_mut() {
            if end == 0 {
                break;
            }
            let start = end.saturating_sub(16);
            *limb = u64::from_str_radix(&digits[start..end], 16)
                .map_err(|_| ParseFrError::InvalidDigit)?;
            end = start;
        }
        Self::from_limbs_checked(limbs).ok_or(ParseFrError::NonCanonical)
    }

    /// Canonical `0x`-prefixed hex, 64 digits.
    pub fn to_hex(&self) -> String {
        alloc::format!("{}", self)
    }
}

/// Helper: Add two 256-bit numbers mod p
#[inline]
const fn add_mod(a: [u64; 4], b: [u64; 4]) -> [u64; 4] {
    let (r0, carry) = a[0].overflowing_add(b[0]);
    let (r1, carry) = carrying_add(a[1], b[1], carry);
    let (r2, carry) = carrying_add(a[2], b[2], carry);
    let (r3, carry) = carrying_add(a[3], b[3], carry);

    // Subtract modulus if we overflowed or result >= p
    let (s0, borrow) = r0.overflowing_sub(MODULUS[0]);
    let (s1, borrow) = borrowing_sub(r1, MODULUS[1], borrow);
    let (s2, borrow) = borrowing_sub(r2, MODULUS[2], borrow);
    let (s3, borrow) = borrowing_sub(r3, MODULUS[3], borrow);

    if carry || !borrow {
        [s0, s1, s2, s3]
    } else {
        [r0, r1, r2, r3]
    }
}

/// Helper: Subtract two 256-bit numbers mod p
#[inline]
const fn sub_mod(a: [u64; 4], b: [u64; 4]) -> [u64; 4] {
    let (r0, borrow) = a[0].overflowing_sub(b[0]);
    let (r1, borrow) = borrowing_sub(a[1], b[1], borrow);
    let (r2, borrow) = borrowing_sub(a[2], b[2], borrow);
    let (r3, borrow) = borrowing_sub(a[3], b[3], borrow);

    // Add modulus if we underflowed
    if borrow {
        let (r0, carry) = r0.overflowing_add(MODULUS[0]);
        let (r1, carry) = carrying_add(r1, MODULUS[1], carry);
        let (r2, carry) = carrying_add(r2, MODULUS[2], carry);
        let (r3, _) = carrying_add(r3, MODULUS[3], carry);
        [r0, r1, r2, r3]
    } else {
        [r0, r1, r2, r3]
    }
}

/// Helper: Negate a 256-bit number mod p
#[inline]
const fn neg_mod(a: [u64; 4]) -> [u64; 4] {
    if a[0] == 0 && a[1] == 0 && a[2] == 0 && a[3] == 0 {
        return [0, 0, 0, 0];
    }
    sub_mod(MODULUS, a)
}

#[inline]
const fn is_canonical(limbs: [u64; 4]) -> bool {
    let (_, borrow) = limbs[0].overflowing_sub(MODULUS[0]);
    let (_, borrow) = borrowing_sub(limbs[1], MODULUS[1], borrow);
    let (_, borrow) = borrowing_sub(limbs[2], MODULUS[2], borrow);
    let (_, borrow) = borrowing_sub(limbs[3], MODULUS[3], borrow);
    borrow
}

/// Helper: Carrying addition
#[inline]
const fn carrying_add(a: u64, b: u64, carry: bool) -> (u64, bool) {
    let (sum, overflow1) = a.overflowing_add(b);
    let (sum, overflow2) = sum.overflowing_add(carry as u64);
    (sum, overflow1 || overflow2)
}

/// Helper: Borrowing subtraction
#[inline]
const fn borrowing_sub(a: u64, b: u64, borrow: bool) -> (u64, bool) {
    let (diff, overflow1) = a.overflowing_sub(b);
    let (diff, overflow2) = diff.overflowing_sub(borrow as u64);
    (diff, overflow1 || overflow2)
}

/// Montgomery multiplication: (a * b * R^{-1}) mod p
#[inline]
fn montgomery_mul(a: Fr, b: Fr) -> Fr {
    let mut t = [0u64; 8];

    for i in 0..4 {
        let mut carry = 0u128;
        for j in 0..4 {
            let product = (a.limbs[i] as u128) * (b.limbs[j] as u128) + (t[i + j] as u128) + carry;
            t[i + j] = product as u64;
            carry = product >> 64;
        }
        t[i + 4] = carry as u64;
    }

    // Montgomery reduction
    for i in 0..4 {
        let k = t[i].wrapping_mul(MU);
        let mut carry = 0u128;

        for j in 0..4 {
            let product = (k as u128) * (MODULUS[j] as u128) + (t[i + j] as u128) + carry;
            t[i + j] = product as u64;
            carry = product >> 64;
        }

        for j in 4..8 - i {
            let sum = (t[i + j] as u128) + carry;
            t[i + j] = sum as u64;
            carry = sum >> 64;
        }
    }

    let result = [t[4], t[5], t[6], t[7]];

    if is_canonical(result) {
        Fr { limbs: result }
    } else {
        Fr {
            limbs: sub_mod(result, MODULUS),
        }
    }
}

impl PrimeCharacteristicRing for Fr {
    type PrimeSubfield = Self;

    const ZERO: Self = Self::ZERO;
    const ONE: Self = Self::ONE;
    const TWO: Self = Fr {
        limbs: add_mod(R, R),
    };
    const NEG_ONE: Self = Fr {
        limbs: sub_mod(MODULUS, R),
    };

    #[inline]
    fn from_prime_subfield(elem: Self::PrimeSubfield) -> Self {
        elem
    }

    #[inline]
    fn halve(&self) -> Self {
        // (self + p) / 2 when odd. p < 2^254, so the sum cannot overflow.
        let limbs = if self.limbs[0] & 1 == 1 {
            let (s0, carry) = self.limbs[0].overflowing_add(MODULUS[0]);
            let (s1, carry) = carrying_add(self.limbs[1], MODULUS[1], carry);
            let (s2, carry) = carrying_add(self.limbs[2], MODULUS[2], carry);
            let (s3, _) = carrying_add(self.limbs[3], MODULUS[3], carry);
            [s0, s1, s2, s3]
        } else {
            self.limbs
        };
        Fr {
            limbs: [
                (limbs[0] >> 1) | (limbs[1] << 63),
                (limbs[1] >> 1) | (limbs[2] << 63),
                (limbs[2] >> 1) | (limbs[3] << 63),
                limbs[3] >> 1,
            ],
        }
    }
}

impl Packable for Fr {}

impl RawDataSerializable for Fr {
    const NUM_BYTES: usize = 32;

    fn into_bytes(self) -> impl IntoIterator<Item = u8> {
        self.to_bytes_le()
    }
}

impl Distribution<Fr> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fr {
        loop {
            let mut limbs: [u64; 4] = rng.random();
            limbs[3] &= TOP_LIMB_MASK;

            if is_canonical(limbs) {
                return Fr::from_canonical_limbs(limbs);
            }
        }
    }
}

impl Field for Fr {
    type Packing = Self;

    // Generator g = 5 in Montgomery form
    const GENERATOR: Self = Fr {
        limbs: [
            0x1b0d0ef99fffffe6,
            0xeaba68a3a32a913f,
            0x47d8eb76d8dd0689,
            0x15d0085520f5bbc3,
        ],
    };

    fn try_inverse(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(self.inverse())
        }
    }

    fn order() -> BigUint {
        let mut bytes = Vec::with_capacity(32);
        for &limb in &MODULUS {
            bytes.extend_from_slice(&limb.to_le_bytes());
        }
        BigUint::from_bytes_le(&bytes)
    }
}

impl PrimeField for Fr {
    fn as_canonical_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.to_bytes_le())
    }
}

macro_rules! quotient_map_unsigned {
    ($($t:ty),*) => {$(
        impl QuotientMap<$t> for Fr {
            fn from_int(int: $t) -> Self {
                Self::from_canonical_u128(int as u128)
            }

            fn from_canonical_checked(int: $t) -> Option<Self> {
                Some(Self::from_canonical_u128(int as u128))
            }

            unsafe fn from_canonical_unchecked(int: $t) -> Self {
                Self::from_canonical_u128(int as u128)
            }
        }
    )*};
}

macro_rules! quotient_map_signed {
    ($($t:ty),*) => {$(
        impl QuotientMap<$t> for Fr {
            fn from_int(int: $t) -> Self {
                let magnitude = Self::from_canonical_u128(int.unsigned_abs() as u128);
                if int < 0 {
                    -magnitude
                } else {
                    magnitude
                }
            }

            fn from_canonical_checked(int: $t) -> Option<Self> {
                Some(Self::from_int(int))
            }

            unsafe fn from_canonical_unchecked(int: $t) -> Self {
                Self::from_int(int)
            }
        }
    )*};
}

quotient_map_unsigned!(u8, u16, u32, u64, u128);
quotient_map_signed!(i8, i16, i32, i64, i128);

impl From<u8> for Fr {
    fn from(value: u8) -> Self {
        Self::from_canonical_u64(value as u64)
    }
}

impl From<u64> for Fr {
    fn from(value: u64) -> Self {
        Self::from_canonical_u64(value)
    }
}

impl From<bool> for Fr {
    fn from(value: bool) -> Self {
        if value {
            Self::ONE
        } else {
            Self::ZERO
        }
    }
}

// Arithmetic operations
impl Add for Fr {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Fr {
            limbs: add_mod(self.limbs, rhs.limbs),
        }
    }
}

impl AddAssign for Fr {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Fr {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Fr {
            limbs: sub_mod(self.limbs, rhs.limbs),
        }
    }
}

impl SubAssign for Fr {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Fr {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Fr {
            limbs: neg_mod(self.limbs),
        }
    }
}

impl Mul for Fr {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        montgomery_mul(self, rhs)
    }
}

impl MulAssign for Fr {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Div for Fr {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        self * rhs.inverse()
    }
}

impl DivAssign for Fr {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Sum for Fr {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

impl Product for Fr {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ONE, |acc, x| acc * x)
    }
}

impl Display for Fr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let canonical = self.to_canonical_limbs();
        write!(
            f,
            "0x{:016x}{:016x}{:016x}{:016x}",
            canonical[3], canonical[2], canonical[1], canonical[0]
        )
    }
}

impl Debug for Fr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Fr({})", self)
    }
}

impl Hash for Fr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.limbs.hash(state);
    }
}

impl FromStr for Fr {
    type Err = ParseFrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Serialized as canonical hex so manifests and snapshots stay readable and
// independent of the Montgomery representation.
impl Serialize for Fr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FrVisitor;

        impl Visitor<'_> for FrVisitor {
            type Value = Fr;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("a 0x-prefixed hex BN254 scalar")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Fr, E> {
                Fr::from_hex(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(FrVisitor)
    }
}

impl Fr {
    /// Compute multiplicative inverse using Fermat's little theorem: a^{p-2}
    pub fn inverse(&self) -> Self {
        let exp = sub_mod(MODULUS, [2, 0, 0, 0]);
        self.pow_vartime(exp)
    }

    /// Variable-time exponentiation
    fn pow_vartime(&self, exp: [u64; 4]) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }

        let mut result = Self::ONE;
        let mut base = *self;

        for &limb in exp.iter() {
            let mut remaining = limb;
            for _ in 0..64 {
                if remaining & 1 == 1 {
                    result = result * base;
                }
                base = base * base;
                remaining >>= 1;
            }
        }

        result
    }

    /// Check if this field element is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs == [0, 0, 0, 0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_fr() -> impl Strategy<Value = Fr> {
        any::<[u64; 4]>().prop_map(|mut limbs| {
            limbs[3] &= TOP_LIMB_MASK >> 1;
            Fr::from_canonical_limbs(limbs)
        })
    }

    #[test]
    fn test_zero_one() {
        assert_eq!(Fr::ZERO + Fr::ZERO, Fr::ZERO);
        assert_eq!(Fr::ONE * Fr::ONE, Fr::ONE);
        assert_eq!(Fr::ZERO * Fr::ONE, Fr::ZERO);
        assert_eq!(Fr::ONE + Fr::ZERO, Fr::ONE);
    }

    #[test]
    fn test_addition() {
        let a = Fr::from_canonical_u64(5);
        let b = Fr::from_canonical_u64(7);
        assert_eq!(a + b, Fr::from_canonical_u64(12));
    }

    #[test]
    fn test_subtraction_wraps() {
        let a = Fr::from_canonical_u64(3);
        let b = Fr::from_canonical_u64(10);
        assert_eq!(a - b, -Fr::from_canonical_u64(7));
        assert_eq!(Fr::ZERO - Fr::ONE, Fr::NEG_ONE);
    }

    #[test]
    fn test_multiplication() {
        let a = Fr::from_canonical_u64(6);
        let b = Fr::from_canonical_u64(7);
        assert_eq!(a * b, Fr::from_canonical_u64(42));
    }

    #[test]
    fn test_modulus_reduces_to_zero() {
        let p_minus_one = Fr::NEG_ONE;
        assert_eq!(p_minus_one + Fr::ONE, Fr::ZERO);
        assert_eq!(
            p_minus_one.to_hex(),
            "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000000"
        );
        assert!(Fr::from_limbs_checked(MODULUS).is_none());
    }

    #[test]
    fn test_inverse() {
        let a = Fr::from_canonical_u64(5);
        assert_eq!(a * a.inverse(), Fr::ONE);
        assert_eq!(Fr::ZERO.try_inverse(), None);
    }

    #[test]
    fn test_generator_is_five() {
        assert_eq!(Fr::GENERATOR, Fr::from_canonical_u64(5));
        assert_eq!(Fr::TWO, Fr::from_canonical_u64(2));
    }

    #[test]
    fn test_u128_and_signed_conversion() {
        let big = (1u128 << 100) + 17;
        let expected = Fr::from_canonical_u64(1 << 50) * Fr::from_canonical_u64(1 << 50)
            + Fr::from_canonical_u64(17);
        assert_eq!(Fr::from_canonical_u128(big), expected);
        assert_eq!(Fr::from_int(-3i32), -Fr::from_canonical_u64(3));
        assert_eq!(Fr::from_int(i64::MIN), -Fr::from_canonical_u128(1u128 << 63));
    }

    #[test]
    fn test_pointer_sized_conversion() {
        assert_eq!(Fr::from_int(7usize), Fr::from_canonical_u64(7));
        assert_eq!(Fr::from_int(-7isize), -Fr::from_canonical_u64(7));
        assert_eq!(Fr::from_usize(usize::MAX), Fr::from_canonical_u64(usize::MAX as u64));
    }

    #[test]
    fn test_hex_round_trip() {
        let a = Fr::from_canonical_u64(0xdead_beef);
        assert_eq!(
            a.to_hex(),
            "0x00000000000000000000000000000000000000000000000000000000deadbeef"
        );
        assert_eq!(Fr::from_hex("0xdeadbeef"), Ok(a));
        assert_eq!(Fr::from_hex("deadbeef"), Err(ParseFrError::MissingPrefix));
        assert_eq!(Fr::from_hex("0xzz"), Err(ParseFrError::InvalidDigit));
        assert_eq!(
            Fr::from_hex("0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001"),
            Err(ParseFrError::NonCanonical)
        );
    }

    #[test]
    fn test_serde_as_hex_string() {
        let a = Fr::from_canonical_u64(42);
        let json = serde_json::to_string(&a).expect("serialize");
        assert_eq!(
            json,
            "\"0x000000000000000000000000000000000000000000000000000000000000002a\""
        );
        let back: Fr = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, a);
    }

    #[test]
    fn test_bytes_le() {
        let a = Fr::from_canonical_u64(0x0102);
        let bytes = a.to_bytes_le();
        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes[1], 0x01);
        assert_eq!(Fr::from_bytes_le(&bytes), Some(a));
        assert_eq!(Fr::from_bytes_le(&[0xff; 32]), None);
    }

    proptest! {
        #[test]
        fn prop_ring_laws(a in arb_fr(), b in arb_fr(), c in arb_fr()) {
            prop_assert_eq!((a + b) * c, a * c + b * c);
            prop_assert_eq!(a * b, b * a);
            prop_assert_eq!(a - b + b, a);
        }

        #[test]
        fn prop_halve(a in arb_fr()) {
            prop_assert_eq!(a.halve() + a.halve(), a);
        }

        #[test]
        fn prop_inverse(a in arb_fr()) {
            prop_assume!(!a.is_zero());
            prop_assert_eq!(a * a.inverse(), Fr::ONE);
        }
    }
}
