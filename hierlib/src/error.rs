use std::num::ParseIntError;
use thiserror::Error;

/// Invalid cache or hierarchy geometry. Raised at construction or insertion time, never corrected
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum ConfigError {
    #[error("associativity must be at least 1")]
    ZeroAssociativity,

    #[error("block size must be at least 1 byte")]
    ZeroBlockSize,

    #[error("capacity of {size} bytes is not divisible by block size {block_size} x associativity {associativity}")]
    IndivisibleCapacity {
        size: u64,
        block_size: u64,
        associativity: u64,
    },

    #[error("configuration leaves the cache with no sets")]
    NoSets,

    #[error("block size {found} does not match the hierarchy block size {expected}")]
    BlockSizeMismatch { expected: u64, found: u64 },

    #[error("a hierarchy needs at least one level")]
    EmptyHierarchy,
}

/// Problems reading or parsing a trace
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line}: expected `[R|W] <address>`, got {content:?}")]
    Malformed { line: usize, content: String },

    #[error("line {line}: invalid address")]
    InvalidAddress {
        line: usize,
        #[source]
        source: ParseIntError,
    },

    #[error("line {line}: trace is not valid UTF-8")]
    Encoding { line: usize },

    #[error("couldn't read the trace: {0}")]
    Io(#[from] std::io::Error),
}

/// Synthetic workload parameters that can't produce a trace
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("invalid address distribution: {0}")]
    Distribution(#[from] rand_distr::NormalError),

    #[error("standard deviation must be a non-negative number, got {0}")]
    InvalidStdDev(f64),

    #[error("workload needs a non-zero stride")]
    ZeroStride,
}
