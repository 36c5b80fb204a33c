use tracing::{debug, trace};
use crate::cache::{AccessKind, CacheTrait, GenericCache};
use crate::error::ConfigError;

/// A write-back, write-allocate hierarchy of caches in front of a flat memory
///
/// The hierarchy is non-inclusive and non-exclusive: lines are only installed in the first level
/// on a miss, and reach the lower levels when they are pushed out of the level above. Nothing is
/// ever written through, a modified line only costs a memory access when the last level evicts it
///
/// Lookups are serial, so every level probed before the one that hits is charged its latency
pub struct HierarchyManager {
    caches: Vec<GenericCache>,
    memory_latency: u64,
    memory_reads: u64,
    memory_writebacks: u64,
}

impl HierarchyManager {
    pub fn new(memory_latency: u64) -> Self {
        Self {
            caches: Vec::new(),
            memory_latency,
            memory_reads: 0,
            memory_writebacks: 0,
        }
    }

    /// Appends a level below the existing ones
    ///
    /// Evicted addresses are rebuilt with one level's geometry and installed in the next, which only
    /// works when every level shares a block size, so a mismatch is rejected here rather than on
    /// the first access that would go wrong
    pub fn add_level(&mut self, cache: GenericCache) -> Result<(), ConfigError> {
        if let Some(first) = self.caches.first() {
            let expected = first.get_block_size();
            let found = cache.get_block_size();
            if expected != found {
                return Err(ConfigError::BlockSizeMismatch { expected, found });
            }
        }
        debug!(level = self.caches.len(), sets = cache.get_num_sets(), ways = cache.get_associativity(), latency = cache.get_latency(), "added cache level");
        self.caches.push(cache);
        Ok(())
    }

    /// Detaches a level and hands it back. An out of range index leaves the hierarchy untouched and
    /// returns None
    pub fn remove_level(&mut self, index: usize) -> Option<GenericCache> {
        if index >= self.caches.len() {
            return None;
        }
        Some(self.caches.remove(index))
    }

    /// Resolves a single access, returning its latency in cycles
    ///
    /// On a full miss the line comes from memory and is installed dirty in the first level, taking
    /// the write-allocate path
    pub fn access(&mut self, address: u64) -> u64 {
        self.resolve(address, AccessKind::Load, true)
    }

    /// Resolves a typed access, returning its latency in cycles
    ///
    /// Loads install clean lines on a full miss. Stores dirty the line wherever it hits, or install
    /// it dirty on a full miss
    pub fn access_as(&mut self, address: u64, kind: AccessKind) -> u64 {
        self.resolve(address, kind, kind == AccessKind::Store)
    }

    fn resolve(&mut self, address: u64, kind: AccessKind, dirty_fill: bool) -> u64 {
        let mut latency = 0;
        for cache in self.caches.iter_mut() {
            latency += cache.get_latency();
            if cache.lookup(address, kind) {
                return latency;
            }
        }
        latency += self.memory_latency;
        self.memory_reads += 1;
        if !self.caches.is_empty() {
            latency += self.fill_and_propagate(0, address, dirty_fill);
        }
        latency
    }

    /// Installs a line at `level` and pushes whatever it displaces further down, returning the cost
    /// of the levels below `level` and of any write-back to memory
    ///
    /// Every displaced valid line is installed one level down whether or not it is dirty, so a line
    /// always exists somewhere below before it leaves a level. Only the last level writes to memory,
    /// and only for dirty lines
    fn fill_and_propagate(&mut self, mut level: usize, mut address: u64, mut dirty: bool) -> u64 {
        let mut latency = 0;
        loop {
            let cache = &mut self.caches[level];
            let evicted = cache.fill(address, dirty);
            if !evicted.valid {
                return latency;
            }
            address = cache.block_address(evicted.tag, evicted.set_index);
            dirty = evicted.dirty;
            trace!(level, address, dirty, "propagating evicted line");
            if level + 1 == self.caches.len() {
                if dirty {
                    debug!(address, "writing back to memory");
                    self.memory_writebacks += 1;
                    latency += self.memory_latency;
                }
                return latency;
            }
            level += 1;
            latency += self.caches[level].get_latency();
        }
    }

    /// Invalidates every level and resets all counters, keeping the configuration
    pub fn clear_all(&mut self) {
        for cache in self.caches.iter_mut() {
            cache.clear();
        }
        self.memory_reads = 0;
        self.memory_writebacks = 0;
    }

    pub fn levels(&self) -> &[GenericCache] {
        &self.caches
    }

    pub fn level(&self, index: usize) -> Option<&GenericCache> {
        self.caches.get(index)
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    pub fn memory_latency(&self) -> u64 {
        self.memory_latency
    }

    /// Number of accesses that missed every level
    pub fn memory_reads(&self) -> u64 {
        self.memory_reads
    }

    /// Number of dirty lines evicted from the last level
    pub fn memory_writebacks(&self) -> u64 {
        self.memory_writebacks
    }
}

impl Default for HierarchyManager {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MEMORY_LATENCY)
    }
}
