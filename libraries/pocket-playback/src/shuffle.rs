//! Shuffle order generation
//!
//! Shuffling produces a new play order with the active track pinned first,
//! so enabling shuffle mid-track never changes what is playing. The other
//! indices are permuted with Fisher-Yates, which is uniform and O(n).

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Injectable randomness for shuffle generation
pub trait RandomSource: Send {
    /// Uniform index in `0..upper` (`upper` is never 0)
    fn below(&mut self, upper: usize) -> usize;
}

/// `RandomSource` backed by any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: RngCore + Send> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<StdRng> {
    /// Deterministic source: the same seed yields the same permutations
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from the operating system
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl<R: RngCore + Send> RandomSource for RngSource<R> {
    fn below(&mut self, upper: usize) -> usize {
        self.0.gen_range(0..upper)
    }
}

/// Random permutation of `0..len` with `pinned` at position 0
///
/// Returns an empty order when `len` is 0.
pub fn pinned_permutation(len: usize, pinned: usize, random: &mut dyn RandomSource) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if len == 0 {
        return order;
    }
    debug_assert!(pinned < len, "pinned index {} out of range {}", pinned, len);

    order.swap(0, pinned);

    // Fisher-Yates over everything after the pinned slot
    let rest = &mut order[1..];
    for i in (1..rest.len()).rev() {
        let j = random.below(i + 1);
        rest.swap(i, j);
    }

    order
}
