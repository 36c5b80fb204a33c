use std::error::Error;
use crate::cache::{AccessKind, CacheTrait, GenericCache};
use crate::config::ReplacementPolicyConfig;
use crate::error::ConfigError;
use crate::hierarchy::HierarchyManager;
use crate::util::{two_level_config, L1_LATENCY, L2_LATENCY};

const MEMORY: u64 = 100;

fn one_line(latency: u64) -> Result<GenericCache, ConfigError> {
    GenericCache::new(64, 64, 1, latency, ReplacementPolicyConfig::LeastRecentlyUsed, 0)
}

fn tiny(levels: &[u64]) -> Result<HierarchyManager, ConfigError> {
    let mut hierarchy = HierarchyManager::new(MEMORY);
    for latency in levels {
        hierarchy.add_level(one_line(*latency)?)?;
    }
    Ok(hierarchy)
}

fn level(hierarchy: &HierarchyManager, index: usize) -> &GenericCache {
    hierarchy.level(index).expect("level exists")
}

#[test]
fn cold_access_costs_every_level_and_memory() -> Result<(), Box<dyn Error>> {
    let mut hierarchy = two_level_config(ReplacementPolicyConfig::LeastRecentlyUsed).build()?;
    assert_eq!(hierarchy.access(0x1000), 4 + 10 + 100);
    assert!(level(&hierarchy, 0).peek(0x1000));
    assert!(!level(&hierarchy, 1).peek(0x1000));
    assert_eq!(hierarchy.memory_reads(), 1);
    assert_eq!(level(&hierarchy, 0).get_miss_count(), 1);
    assert_eq!(level(&hierarchy, 1).get_miss_count(), 1);

    assert_eq!(hierarchy.access(0x1000), L1_LATENCY);
    assert_eq!(level(&hierarchy, 0).get_hit_count(), 1);
    assert_eq!(level(&hierarchy, 1).get_hit_count() + level(&hierarchy, 1).get_miss_count(), 1);
    Ok(())
}

#[test]
fn l1_victim_moves_to_l2_and_hits_there() -> Result<(), Box<dyn Error>> {
    let mut hierarchy = two_level_config(ReplacementPolicyConfig::LeastRecentlyUsed).build()?;
    // 8KiB apart, all in L1 set 64
    let stride = 64 * 128;
    for i in 0..4 {
        assert_eq!(hierarchy.access(0x1000 + i * stride), 114);
    }
    // Fifth line pushes 0x1000 out of L1, installing it in L2
    assert_eq!(hierarchy.access(0x1000 + 4 * stride), 114 + L2_LATENCY);
    assert!(!level(&hierarchy, 0).peek(0x1000));
    assert!(level(&hierarchy, 1).peek(0x1000));

    assert_eq!(hierarchy.access(0x1000), L1_LATENCY + L2_LATENCY);
    assert_eq!(level(&hierarchy, 1).get_hit_count(), 1);
    assert_eq!(hierarchy.memory_writebacks(), 0);
    Ok(())
}

#[test]
fn dirty_victim_of_last_level_is_written_back() -> Result<(), Box<dyn Error>> {
    let mut hierarchy = tiny(&[1])?;
    assert_eq!(hierarchy.access(0), 101);
    // 0 was installed dirty, so evicting it costs a memory write
    assert_eq!(hierarchy.access(64), 201);
    assert_eq!(hierarchy.memory_reads(), 2);
    assert_eq!(hierarchy.memory_writebacks(), 1);
    Ok(())
}

#[test]
fn clean_victims_are_dropped_silently() -> Result<(), Box<dyn Error>> {
    let mut hierarchy = tiny(&[1])?;
    assert_eq!(hierarchy.access_as(0, AccessKind::Load), 101);
    assert_eq!(hierarchy.access_as(64, AccessKind::Load), 101);
    assert_eq!(hierarchy.memory_writebacks(), 0);
    Ok(())
}

#[test]
fn store_hit_dirties_the_line() -> Result<(), Box<dyn Error>> {
    let mut hierarchy = tiny(&[1])?;
    assert_eq!(hierarchy.access_as(0, AccessKind::Load), 101);
    assert_eq!(hierarchy.access_as(0, AccessKind::Store), 1);
    assert_eq!(hierarchy.access_as(64, AccessKind::Load), 201);
    Ok(())
}

#[test]
fn evictions_propagate_through_every_level() -> Result<(), Box<dyn Error>> {
    let mut hierarchy = tiny(&[1, 10])?;
    assert_eq!(hierarchy.access(0), 111);
    // L1 pushes 0 into the empty L2
    assert_eq!(hierarchy.access(64), 121);
    // L1 pushes 64 into L2, which pushes dirty 0 out to memory
    assert_eq!(hierarchy.access(128), 221);
    assert_eq!(hierarchy.memory_writebacks(), 1);
    assert!(level(&hierarchy, 1).peek(64));
    Ok(())
}

#[test]
fn clean_lines_still_move_down_a_level() -> Result<(), Box<dyn Error>> {
    let mut hierarchy = tiny(&[1, 10])?;
    assert_eq!(hierarchy.access_as(0, AccessKind::Load), 111);
    assert_eq!(hierarchy.access_as(64, AccessKind::Load), 121);
    assert_eq!(hierarchy.access_as(128, AccessKind::Load), 121);
    assert_eq!(hierarchy.memory_writebacks(), 0);
    assert_eq!(hierarchy.access_as(64, AccessKind::Load), 11);
    Ok(())
}

#[test]
fn rejects_mismatched_block_size() -> Result<(), Box<dyn Error>> {
    let mut hierarchy = two_level_config(ReplacementPolicyConfig::LeastRecentlyUsed).build()?;
    let l3 = GenericCache::new(1 << 20, 128, 8, 30, ReplacementPolicyConfig::LeastRecentlyUsed, 0)?;
    assert_eq!(hierarchy.add_level(l3).err(), Some(ConfigError::BlockSizeMismatch { expected: 64, found: 128 }));
    assert_eq!(hierarchy.len(), 2);
    Ok(())
}

#[test]
fn remove_level_out_of_range_is_a_no_op() -> Result<(), Box<dyn Error>> {
    let mut hierarchy = two_level_config(ReplacementPolicyConfig::LeastRecentlyUsed).build()?;
    hierarchy.access(0x1000);
    assert!(hierarchy.remove_level(2).is_none());
    assert_eq!(hierarchy.len(), 2);

    let removed = hierarchy.remove_level(0).expect("level 0 exists");
    assert_eq!(removed.get_latency(), L1_LATENCY);
    assert!(removed.peek(0x1000));
    assert_eq!(hierarchy.len(), 1);
    assert_eq!(level(&hierarchy, 0).get_latency(), L2_LATENCY);
    // The remaining level is untouched by the removal
    assert_eq!(level(&hierarchy, 0).get_miss_count(), 1);
    assert_eq!(hierarchy.access(0x1000), L2_LATENCY + MEMORY);
    Ok(())
}

#[test]
fn clear_all_resets_every_level() -> Result<(), Box<dyn Error>> {
    let mut hierarchy = two_level_config(ReplacementPolicyConfig::FirstInFirstOut).build()?;
    let stride = 64 * 128;
    for i in 0..16 {
        hierarchy.access(0x1000 + i * stride);
    }
    hierarchy.clear_all();
    assert_eq!(hierarchy.memory_reads(), 0);
    assert_eq!(hierarchy.memory_writebacks(), 0);
    for cache in hierarchy.levels() {
        assert_eq!(cache.get_hit_count(), 0);
        assert_eq!(cache.get_miss_count(), 0);
        assert!((0..16).all(|i| !cache.peek(0x1000 + i * stride)));
    }
    assert_eq!(hierarchy.len(), 2);
    assert_eq!(hierarchy.access(0x1000), 114);
    Ok(())
}

#[test]
fn empty_hierarchy_goes_straight_to_memory() {
    let mut hierarchy = HierarchyManager::default();
    assert!(hierarchy.is_empty());
    assert_eq!(hierarchy.access(0x1000), hierarchy.memory_latency());
    assert_eq!(hierarchy.memory_reads(), 1);
}
