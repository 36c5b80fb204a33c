use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::block::Block;

/// Seed used by [`Random`] when none is configured
pub const DEFAULT_SEED: u64 = 42;

/// A generic trait for implementing new replacement policies. Can be used to parameterise a Cache.
///
/// The cache always prefers an invalid slot over evicting a live line, so the policy is only
/// consulted when every block in the set is valid
pub trait ReplacementPolicy {
    /// Picks the way to evict from a full set
    ///
    /// # Arguments
    ///
    /// * `set`: The blocks of the set, indexed by way. Never empty
    ///
    /// returns: usize, the way index within `set`
    fn select_victim(&mut self, set: &[Block]) -> usize;

    /// Restores the policy to its freshly constructed state. Called when the cache is cleared
    ///
    /// Stamp based policies keep their state in the blocks, so a default which does nothing is
    /// provided
    fn reset(&mut self) {}
}

/// Finds the way with the smallest stamp. Ties go to the lowest way index
///
/// Kept as a manual loop, the compiler can't see through `.enumerate()` as well here
#[inline]
fn min_stamp_way(set: &[Block], stamp: impl Fn(&Block) -> u64) -> usize {
    let mut way = 0;
    let mut min_value = u64::MAX;
    let mut min_way = 0;
    while way < set.len() {
        let value = stamp(&set[way]);
        if value < min_value {
            min_value = value;
            min_way = way;
        }
        way += 1;
    }
    min_way
}

/// Least Recently Used replacement policy
///
/// The cache keeps a logical clock and stamps each block on every hit and load, so the policy only
/// has to find the oldest recency stamp
#[derive(Debug, Default, Copy, Clone)]
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn select_victim(&mut self, set: &[Block]) -> usize {
        min_stamp_way(set, |b| b.recency_stamp)
    }
}

/// First In First Out replacement policy
///
/// Evicts the line that was loaded longest ago. Hits never move a line in the queue, as the load
/// stamp is only written when the line is brought in
#[derive(Debug, Default, Copy, Clone)]
pub struct FirstInFirstOut;

impl ReplacementPolicy for FirstInFirstOut {
    fn select_victim(&mut self, set: &[Block]) -> usize {
        min_stamp_way(set, |b| b.load_stamp)
    }
}

/// Uniform random replacement
///
/// The generator is seeded once when the cache is built and advances across evictions, so
/// consecutive evictions pick different ways while the whole run stays reproducible
#[derive(Debug, Clone)]
pub struct Random {
    seed: u64,
    rng: StdRng,
}

impl Random {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl ReplacementPolicy for Random {
    fn select_victim(&mut self, set: &[Block]) -> usize {
        self.rng.gen_range(0..set.len())
    }

    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }
}
