use std::io::Read;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::cache::GenericCache;
use crate::error::ConfigError;
use crate::hierarchy::HierarchyManager;
use crate::replacement_policies::DEFAULT_SEED;

/// Memory latency used when the configuration doesn't give one
pub const DEFAULT_MEMORY_LATENCY: u64 = 100;

/// A cache hierarchy configuration, levels ordered from closest to the requester outwards
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HierarchyConfig {
    #[serde(default = "default_memory_latency")]
    pub memory_latency: u64,
    pub levels: Vec<LevelConfig>,
}

/// A configuration for a single cache level
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LevelConfig {
    pub name: String,
    pub size: u64,
    pub block_size: u64,
    pub associativity: AssociativityConfig,
    #[serde(default)]
    pub replacement_policy: ReplacementPolicyConfig,
    pub latency: u64,
    /// Only used by the random policy
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Either a number of ways, or one of the named layouts
#[derive(Debug, Copy, Clone, Deserialize, Serialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum AssociativityConfig {
    Ways(u64),
    Kind(CacheKindConfig),
}

/// Named layouts - direct mapped, or fully associative
#[derive(Debug, Copy, Clone, Deserialize, Serialize, Eq, PartialEq)]
pub enum CacheKindConfig {
    #[serde(alias = "direct")]
    Direct,
    #[serde(alias = "full")]
    Full,
}

/// The replacement policy - lru, fifo, or random. Defaults to lru.
#[derive(Debug, Default, Copy, Clone, Deserialize, Serialize, Eq, PartialEq)]
pub enum ReplacementPolicyConfig {
    #[default]
    #[serde(alias = "lru")]
    LeastRecentlyUsed,
    #[serde(alias = "fifo")]
    FirstInFirstOut,
    #[serde(alias = "random")]
    Random,
}

fn default_memory_latency() -> u64 {
    DEFAULT_MEMORY_LATENCY
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl LevelConfig {
    /// Number of blocks per set this configuration describes
    ///
    /// A fully associative cache has a single set, so its associativity is the number of lines.
    /// Capacities that aren't a whole number of lines are left for the cache to reject
    pub fn ways(&self) -> u64 {
        match self.associativity {
            AssociativityConfig::Ways(ways) => ways,
            AssociativityConfig::Kind(CacheKindConfig::Direct) => 1,
            AssociativityConfig::Kind(CacheKindConfig::Full) => {
                if self.block_size == 0 {
                    0
                } else {
                    self.size / self.block_size
                }
            }
        }
    }

    /// Creates a new cache from a level configuration
    pub fn build(&self) -> Result<GenericCache, ConfigError> {
        let cache = GenericCache::new(self.size, self.block_size, self.ways(), self.latency, self.replacement_policy, self.seed)?;
        debug!(name = %self.name, size = self.size, block_size = self.block_size, ways = self.ways(), policy = ?self.replacement_policy, latency = self.latency, "built cache level");
        Ok(cache)
    }
}

impl HierarchyConfig {
    /// Parses a JSON configuration
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    /// Builds every level and chains them into a hierarchy
    ///
    /// Fails on the first invalid level, or when the levels don't share a block size
    pub fn build(&self) -> Result<HierarchyManager, ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::EmptyHierarchy);
        }
        let mut hierarchy = HierarchyManager::new(self.memory_latency);
        for level in &self.levels {
            hierarchy.add_level(level.build()?)?;
        }
        Ok(hierarchy)
    }

    pub fn level_names(&self) -> Vec<String> {
        self.levels.iter().map(|l| l.name.clone()).collect()
    }
}
