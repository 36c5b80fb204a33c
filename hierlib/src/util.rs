use crate::config::{AssociativityConfig, HierarchyConfig, LevelConfig, ReplacementPolicyConfig, DEFAULT_MEMORY_LATENCY};
use crate::replacement_policies::DEFAULT_SEED;

pub const L1_SIZE: u64 = 32 * 1024;
pub const BLOCK_SIZE: u64 = 64;
pub const ASSOCIATIVITY: u64 = 4;
pub const L1_LATENCY: u64 = 4;
pub const L2_LATENCY: u64 = 10;

/// A 32KiB 4-way L1 (4 cycles) over a 128KiB 4-way L2 (10 cycles), both with 64 byte lines, in
/// front of a 100 cycle memory
pub fn two_level_config(policy: ReplacementPolicyConfig) -> HierarchyConfig {
    HierarchyConfig {
        memory_latency: DEFAULT_MEMORY_LATENCY,
        levels: vec![
            level("L1", L1_SIZE, L1_LATENCY, policy),
            level("L2", L1_SIZE * 4, L2_LATENCY, policy),
        ],
    }
}

fn level(name: &str, size: u64, latency: u64, policy: ReplacementPolicyConfig) -> LevelConfig {
    LevelConfig {
        name: name.to_string(),
        size,
        block_size: BLOCK_SIZE,
        associativity: AssociativityConfig::Ways(ASSOCIATIVITY),
        replacement_policy: policy,
        latency,
        seed: DEFAULT_SEED,
    }
}
