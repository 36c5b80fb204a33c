use std::ops::Range;
use tracing::trace;
use crate::block::Block;
use crate::config::ReplacementPolicyConfig;
use crate::error::ConfigError;
use crate::replacement_policies::{FirstInFirstOut, LeastRecentlyUsed, Random, ReplacementPolicy};

/// Whether an access only reads the line or also modifies it
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AccessKind {
    Load,
    Store,
}

/// A generic trait for caches
///
/// Technically not required as we're using static dispatch through [`GenericCache`] instead of
/// dyn Cache, but it keeps the hierarchy independent of the replacement policies
///
/// The trait assumes that ensuring accesses spanning multiple cache lines are split properly is the
/// responsibility of the caller
pub trait CacheTrait {
    /// Converts an address into a set index and a tag
    ///
    /// `set = (address / block_size) % num_sets` and `tag = address / (block_size * num_sets)`
    ///
    /// returns: (u64, u64)
    fn address_to_set_and_tag(&self, input: u64) -> (u64, u64);

    /// The inverse of [`CacheTrait::address_to_set_and_tag`], giving the block aligned address
    fn block_address(&self, tag: u64, set_index: u64) -> u64;

    /// Reads a line as a standalone cache, returning true on a hit
    ///
    /// On a miss the line is loaded clean, evicting according to the replacement policy
    fn read(&mut self, input: u64) -> bool;

    /// Writes a line as a standalone write-back, write-allocate cache, returning true on a hit
    ///
    /// Hits mark the line dirty, misses load it dirty
    fn write(&mut self, input: u64) -> bool;

    /// Probes the cache as one level of a hierarchy, returning true on a hit
    ///
    /// Hits and misses are counted and a hit refreshes recency (a store hit also marks the line
    /// dirty), but nothing is allocated on a miss. Allocation happens separately through
    /// [`CacheTrait::fill`]
    fn lookup(&mut self, input: u64, kind: AccessKind) -> bool;

    /// Installs a line as one level of a hierarchy, returning the block previously occupying the
    /// slot it landed in
    ///
    /// The returned block is invalid when nothing was displaced. A line which is already resident
    /// lands on its own slot, so it absorbs `dirty` and nothing is displaced. Fills are not counted
    /// as hits or misses, the demand lookup has already been counted
    fn fill(&mut self, input: u64, dirty: bool) -> Block;

    /// Checks whether a line is resident without touching counters or replacement state
    fn peek(&self, input: u64) -> bool;

    /// Invalidates every line and resets the counters and replacement state. The geometry is kept
    fn clear(&mut self);

    /// The blocks of a set, indexed by way. None when `set_index` is not below the number of sets
    fn get_set(&self, set_index: u64) -> Option<&[Block]>;

    fn get_hit_count(&self) -> u64;

    fn get_miss_count(&self) -> u64;

    fn get_num_sets(&self) -> u64;

    fn get_block_size(&self) -> u64;

    fn get_associativity(&self) -> u64;

    /// Cycles charged every time this cache is accessed
    fn get_latency(&self) -> u64;

    /// Gets the number of invalid cache lines. Useful for analysing cache performance or debugging
    fn get_invalid_line_count(&self) -> usize;
}

/// A generic cache implementation, parameterised by a replacement policy
///
/// Blocks are stored in one flat arena, set `s` occupying `s * associativity..(s + 1) *
/// associativity`. Evicted blocks are copied out rather than referenced, so the arena is only ever
/// touched through the cache's own operations
///
/// Every operation advances a logical clock, which is used to stamp blocks for LRU and FIFO
pub struct Cache<R: ReplacementPolicy> {
    blocks: Vec<Block>,
    replacement_policy: R,
    block_size: u64,
    num_sets: u64,
    associativity: u64,
    latency: u64,
    time: u64,
    hits: u64,
    misses: u64,
}

impl<R: ReplacementPolicy> Cache<R> {
    /// Creates an empty cache
    ///
    /// # Arguments
    ///
    /// * `size`: Total capacity in bytes
    /// * `block_size`: Line size in bytes
    /// * `associativity`: Blocks per set, 1 for direct mapped
    /// * `latency`: Cycles charged per access
    /// * `policy`: Replacement policy used once a set is full
    ///
    /// returns: Result<Cache<R>, ConfigError>, geometry that doesn't divide evenly is rejected
    pub fn new(size: u64, block_size: u64, associativity: u64, latency: u64, policy: R) -> Result<Self, ConfigError> {
        if associativity == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        if block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        let set_bytes = block_size.checked_mul(associativity).ok_or(ConfigError::NoSets)?;
        if size % set_bytes != 0 {
            return Err(ConfigError::IndivisibleCapacity { size, block_size, associativity });
        }
        let num_sets = size / set_bytes;
        if num_sets == 0 {
            return Err(ConfigError::NoSets);
        }
        Ok(Self {
            blocks: vec![Block::default(); (num_sets * associativity) as usize],
            replacement_policy: policy,
            block_size,
            num_sets,
            associativity,
            latency,
            time: 0,
            hits: 0,
            misses: 0,
        })
    }

    pub fn replacement_policy(&self) -> &R {
        &self.replacement_policy
    }

    fn tick(&mut self) -> u64 {
        self.time += 1;
        self.time
    }

    fn set_range(&self, set_index: u64) -> Range<usize> {
        let lower = (set_index * self.associativity) as usize;
        lower..lower + self.associativity as usize
    }

    /// Arena index of the valid block holding `tag` in the set, if any
    fn find(&self, set_index: u64, tag: u64) -> Option<usize> {
        let range = self.set_range(set_index);
        let start = range.start;
        self.blocks[range].iter().position(|b| b.matches(tag)).map(|way| start + way)
    }

    /// Arena index of the slot to load into. An invalid slot is always preferred over eviction
    fn victim(&mut self, set_index: u64) -> usize {
        let range = self.set_range(set_index);
        let start = range.start;
        let set = &self.blocks[range];
        let way = match set.iter().position(|b| !b.valid) {
            Some(way) => way,
            None => self.replacement_policy.select_victim(set),
        };
        start + way
    }

    /// Loads `tag` into the victim slot of its set, returning the previous occupant
    fn allocate(&mut self, set_index: u64, tag: u64, dirty: bool, time: u64) -> Block {
        let index = self.victim(set_index);
        let evicted = self.blocks[index];
        self.blocks[index].load(tag, set_index, dirty, time);
        if evicted.valid {
            trace!(set = set_index, way = index as u64 - set_index * self.associativity, evicted_tag = evicted.tag, dirty = evicted.dirty, "evicted block");
        }
        evicted
    }
}

impl<R: ReplacementPolicy> CacheTrait for Cache<R> {
    fn address_to_set_and_tag(&self, input: u64) -> (u64, u64) {
        let line = input / self.block_size;
        (line % self.num_sets, line / self.num_sets)
    }

    fn block_address(&self, tag: u64, set_index: u64) -> u64 {
        (tag * self.num_sets + set_index) * self.block_size
    }

    fn read(&mut self, input: u64) -> bool {
        let time = self.tick();
        let (set, tag) = self.address_to_set_and_tag(input);
        if let Some(index) = self.find(set, tag) {
            self.hits += 1;
            self.blocks[index].touch(time);
            return true;
        }
        self.misses += 1;
        self.allocate(set, tag, false, time);
        false
    }

    fn write(&mut self, input: u64) -> bool {
        let time = self.tick();
        let (set, tag) = self.address_to_set_and_tag(input);
        if let Some(index) = self.find(set, tag) {
            self.hits += 1;
            let block = &mut self.blocks[index];
            block.touch(time);
            block.dirty = true;
            return true;
        }
        self.misses += 1;
        self.allocate(set, tag, true, time);
        false
    }

    fn lookup(&mut self, input: u64, kind: AccessKind) -> bool {
        let time = self.tick();
        let (set, tag) = self.address_to_set_and_tag(input);
        match self.find(set, tag) {
            Some(index) => {
                self.hits += 1;
                let block = &mut self.blocks[index];
                block.touch(time);
                if kind == AccessKind::Store {
                    block.dirty = true;
                }
                true
            }
            None => {
                self.misses += 1;
                false
            }
        }
    }

    fn fill(&mut self, input: u64, dirty: bool) -> Block {
        let time = self.tick();
        let (set, tag) = self.address_to_set_and_tag(input);
        if let Some(index) = self.find(set, tag) {
            let block = &mut self.blocks[index];
            block.touch(time);
            block.dirty |= dirty;
            return Block::default();
        }
        self.allocate(set, tag, dirty, time)
    }

    fn peek(&self, input: u64) -> bool {
        let (set, tag) = self.address_to_set_and_tag(input);
        self.find(set, tag).is_some()
    }

    fn clear(&mut self) {
        self.blocks.fill(Block::default());
        self.replacement_policy.reset();
        self.time = 0;
        self.hits = 0;
        self.misses = 0;
    }

    fn get_set(&self, set_index: u64) -> Option<&[Block]> {
        if set_index >= self.num_sets {
            return None;
        }
        Some(&self.blocks[self.set_range(set_index)])
    }

    fn get_hit_count(&self) -> u64 {
        self.hits
    }

    fn get_miss_count(&self) -> u64 {
        self.misses
    }

    fn get_num_sets(&self) -> u64 {
        self.num_sets
    }

    fn get_block_size(&self) -> u64 {
        self.block_size
    }

    fn get_associativity(&self) -> u64 {
        self.associativity
    }

    fn get_latency(&self) -> u64 {
        self.latency
    }

    fn get_invalid_line_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.valid).count()
    }
}

/// Enum for the three replacement policies provided by the library
///
/// Using trait objects in Rust reduces boilerplate, but it is surprisingly slow, as this is
/// completely opaque to the compiler
///
/// For most cases this isn't an issue, but the hierarchy probes every level for every access in a
/// trace, which would mean de-referencing per level per access
///
/// It's much faster to explicitly branch on all implementations, as the compiler can reason about
/// the concrete types, perform function inlining etc
pub enum GenericCache {
    LeastRecentlyUsed(Cache<LeastRecentlyUsed>),
    FirstInFirstOut(Cache<FirstInFirstOut>),
    Random(Cache<Random>),
}

impl GenericCache {
    /// Creates a cache with the replacement policy picked at runtime
    ///
    /// `seed` is only used by the random policy
    pub fn new(size: u64, block_size: u64, associativity: u64, latency: u64, policy: ReplacementPolicyConfig, seed: u64) -> Result<Self, ConfigError> {
        Ok(match policy {
            ReplacementPolicyConfig::LeastRecentlyUsed => {
                Cache::new(size, block_size, associativity, latency, LeastRecentlyUsed)?.into()
            }
            ReplacementPolicyConfig::FirstInFirstOut => {
                Cache::new(size, block_size, associativity, latency, FirstInFirstOut)?.into()
            }
            ReplacementPolicyConfig::Random => {
                Cache::new(size, block_size, associativity, latency, Random::new(seed))?.into()
            }
        })
    }

    pub fn policy(&self) -> ReplacementPolicyConfig {
        match self {
            GenericCache::LeastRecentlyUsed(_) => ReplacementPolicyConfig::LeastRecentlyUsed,
            GenericCache::FirstInFirstOut(_) => ReplacementPolicyConfig::FirstInFirstOut,
            GenericCache::Random(_) => ReplacementPolicyConfig::Random,
        }
    }
}

impl From<Cache<LeastRecentlyUsed>> for GenericCache {
    fn from(value: Cache<LeastRecentlyUsed>) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<Cache<FirstInFirstOut>> for GenericCache {
    fn from(value: Cache<FirstInFirstOut>) -> Self {
        Self::FirstInFirstOut(value)
    }
}

impl From<Cache<Random>> for GenericCache {
    fn from(value: Cache<Random>) -> Self {
        Self::Random(value)
    }
}

// Same branch for every method, only the concrete cache type differs
macro_rules! dispatch {
    ($self:ident, $c:ident => $body:expr) => {
        match $self {
            GenericCache::LeastRecentlyUsed($c) => $body,
            GenericCache::FirstInFirstOut($c) => $body,
            GenericCache::Random($c) => $body,
        }
    };
}

impl CacheTrait for GenericCache {
    fn address_to_set_and_tag(&self, input: u64) -> (u64, u64) {
        dispatch!(self, c => c.address_to_set_and_tag(input))
    }

    fn block_address(&self, tag: u64, set_index: u64) -> u64 {
        dispatch!(self, c => c.block_address(tag, set_index))
    }

    fn read(&mut self, input: u64) -> bool {
        dispatch!(self, c => c.read(input))
    }

    fn write(&mut self, input: u64) -> bool {
        dispatch!(self, c => c.write(input))
    }

    fn lookup(&mut self, input: u64, kind: AccessKind) -> bool {
        dispatch!(self, c => c.lookup(input, kind))
    }

    fn fill(&mut self, input: u64, dirty: bool) -> Block {
        dispatch!(self, c => c.fill(input, dirty))
    }

    fn peek(&self, input: u64) -> bool {
        dispatch!(self, c => c.peek(input))
    }

    fn clear(&mut self) {
        dispatch!(self, c => c.clear())
    }

    fn get_set(&self, set_index: u64) -> Option<&[Block]> {
        dispatch!(self, c => c.get_set(set_index))
    }

    fn get_hit_count(&self) -> u64 {
        dispatch!(self, c => c.get_hit_count())
    }

    fn get_miss_count(&self) -> u64 {
        dispatch!(self, c => c.get_miss_count())
    }

    fn get_num_sets(&self) -> u64 {
        dispatch!(self, c => c.get_num_sets())
    }

    fn get_block_size(&self) -> u64 {
        dispatch!(self, c => c.get_block_size())
    }

    fn get_associativity(&self) -> u64 {
        dispatch!(self, c => c.get_associativity())
    }

    fn get_latency(&self) -> u64 {
        dispatch!(self, c => c.get_latency())
    }

    fn get_invalid_line_count(&self) -> usize {
        dispatch!(self, c => c.get_invalid_line_count())
    }
}
