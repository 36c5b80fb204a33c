use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use crate::error::WorkloadError;
use crate::trace::TraceEntry;

/// Highest address produced by the random workloads, a 64KiB address space
pub const DEFAULT_MAX_ADDRESS: u64 = 0xFFFF;
pub const DEFAULT_ACCESS_COUNT: usize = 10_000;
pub const DEFAULT_SEQUENTIAL_BASE: u64 = 0x1000;
pub const DEFAULT_SEQUENTIAL_BLOCKS: u64 = 1000;

/// Synthetic address traces, all reproducible from a seed
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq)]
pub enum Workload {
    /// Addresses drawn uniformly from `0..=max_address`, alternating loads and stores
    Uniform { count: usize, max_address: u64 },
    /// Addresses drawn from a normal distribution and clamped to `0..=max_address`, alternating
    /// loads and stores. Clusters accesses around `mean`
    Localized {
        count: usize,
        mean: f64,
        std_dev: f64,
        max_address: u64,
    },
    /// `passes` sweeps over `blocks` consecutive blocks starting at `base`, as untyped accesses.
    /// With a stride of one block, the second pass shows what survived the first
    Sequential { base: u64, blocks: u64, stride: u64, passes: u32 },
}

impl Workload {
    pub fn uniform(count: usize) -> Self {
        Workload::Uniform { count, max_address: DEFAULT_MAX_ADDRESS }
    }

    /// Centred on 32KiB with an 8KiB standard deviation
    pub fn localized(count: usize) -> Self {
        Workload::Localized {
            count,
            mean: 32768.0,
            std_dev: 8192.0,
            max_address: DEFAULT_MAX_ADDRESS,
        }
    }

    /// Two passes over 1000 blocks from 0x1000
    pub fn sequential(block_size: u64) -> Self {
        Workload::Sequential {
            base: DEFAULT_SEQUENTIAL_BASE,
            blocks: DEFAULT_SEQUENTIAL_BLOCKS,
            stride: block_size,
            passes: 2,
        }
    }

    /// Generates the trace. The sequential workload ignores the seed
    pub fn generate(&self, seed: u64) -> Result<Vec<TraceEntry>, WorkloadError> {
        let mut rng = StdRng::seed_from_u64(seed);
        match *self {
            Workload::Uniform { count, max_address } => {
                Ok((0..count).map(|i| alternate(i, rng.gen_range(0..=max_address))).collect())
            }
            Workload::Localized { count, mean, std_dev, max_address } => {
                // Normal::new lets a negative deviation through and mirrors the distribution
                if std_dev.is_nan() || std_dev < 0.0 {
                    return Err(WorkloadError::InvalidStdDev(std_dev));
                }
                let normal = Normal::new(mean, std_dev)?;
                Ok((0..count)
                    .map(|i| {
                        let address = normal.sample(&mut rng).clamp(0.0, max_address as f64) as u64;
                        alternate(i, address)
                    })
                    .collect())
            }
            Workload::Sequential { base, blocks, stride, passes } => {
                if stride == 0 {
                    return Err(WorkloadError::ZeroStride);
                }
                Ok((0..passes)
                    .flat_map(|_| (0..blocks).map(move |i| TraceEntry::untyped(base + i * stride)))
                    .collect())
            }
        }
    }
}

// Even accesses load, odd accesses store
fn alternate(index: usize, address: u64) -> TraceEntry {
    if index % 2 == 0 {
        TraceEntry::load(address)
    } else {
        TraceEntry::store(address)
    }
}
