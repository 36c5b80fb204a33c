//! # HierLib
//!
//! Hierlib is a library for simulating the latency of cache hierarchies
//!
//! It provides a set-associative cache which can be parameterised by a replacement policy, a
//! manager chaining caches into a write-back, write-allocate, non-inclusive non-exclusive
//! hierarchy, and a simulator to run address traces through a hierarchy described in JSON
//!
//! No data is simulated, only which lines are resident, which are dirty, and what every access
//! costs

/// Contains the cache line slot shared by the caches and the hierarchy
pub mod block;

/// Contains the implementation of the cache, and a utility enum for the provided policies
pub mod cache;

/// Contains definitions for the JSON configuration format
pub mod config;

/// Contains the error types for configuration, traces and workloads
pub mod error;

/// Contains the hierarchy manager, which resolves accesses across levels
pub mod hierarchy;

/// Contains the trace file reader
pub mod io;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Contains the simulator used to run a trace through a configured hierarchy
pub mod simulator;

/// Contains the trace entry type and the text trace format
pub mod trace;

/// Contains seeded synthetic trace generators
pub mod workload;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
