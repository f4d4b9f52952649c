use rand::distr::{Distribution, StandardUniform};
use rand::Rng;

use crate::Fr;

/// Helper trait for sampling random field elements.
pub trait RandomField: Sized {
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self;

    /// Samples `n` independent elements.
    fn random_vec<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<Self> {
        (0..n).map(|_| Self::random(rng)).collect()
    }
}

impl RandomField for Fr {
    #[inline]
    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StandardUniform.sample(rng)
    }
}
