use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::cache::CacheTrait;
use crate::config::HierarchyConfig;
use crate::error::{ConfigError, TraceError};
use crate::hierarchy::HierarchyManager;
use crate::trace::{parse_trace, TraceEntry};

/// The simulator feeds traces through a hierarchy and collects results.
///
/// It supports calling simulate multiple times, and will update the time taken to simulate and the
/// results accordingly
pub struct Simulator {
    hierarchy: HierarchyManager,
    result: SimulationResult,
    simulation_time: Duration,
}

/// The result of a simulation. Can be serialised as the JSON report
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    pub accesses: u64,
    pub total_latency: u64,
    pub average_latency: f64,
    pub memory_reads: u64,
    pub memory_writebacks: u64,
    pub caches: Vec<LevelResult>,
}

/// The result for an individual level
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LevelResult {
    pub name: String,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

impl Simulator {
    /// Creates a new simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A hierarchy configuration, usually resulting from parsing JSON
    ///
    /// returns: Result<Simulator, ConfigError>
    pub fn new(config: &HierarchyConfig) -> Result<Self, ConfigError> {
        let hierarchy = config.build()?;
        let result = SimulationResult {
            accesses: 0,
            total_latency: 0,
            average_latency: 0.0,
            memory_reads: 0,
            memory_writebacks: 0,
            caches: config.levels.iter().map(|level| LevelResult {
                name: level.name.clone(),
                hits: 0,
                misses: 0,
                hit_rate: 0.0,
            }).collect(),
        };
        Ok(Self {
            hierarchy,
            result,
            simulation_time: Duration::new(0, 0),
        })
    }

    /// Runs every entry of a trace through the hierarchy, in order
    ///
    /// Untyped entries use [`HierarchyManager::access`], typed ones [`HierarchyManager::access_as`]
    pub fn simulate(&mut self, trace: &[TraceEntry]) -> &SimulationResult {
        let start = Instant::now();
        let mut latency = 0;
        for entry in trace {
            latency += match entry.kind {
                None => self.hierarchy.access(entry.address),
                Some(kind) => self.hierarchy.access_as(entry.address, kind),
            };
        }
        self.simulation_time += start.elapsed();
        self.result.accesses += trace.len() as u64;
        self.result.total_latency += latency;
        self.refresh_counters();
        debug!(accesses = trace.len(), latency, "simulated trace");
        &self.result
    }

    /// Parses a text trace and simulates it
    pub fn simulate_bytes(&mut self, bytes: &[u8]) -> Result<&SimulationResult, TraceError> {
        let trace = parse_trace(bytes)?;
        Ok(self.simulate(&trace))
    }

    /// Clears every level and the collected results, keeping the configuration
    pub fn reset(&mut self) {
        self.hierarchy.clear_all();
        self.result.accesses = 0;
        self.result.total_latency = 0;
        self.simulation_time = Duration::new(0, 0);
        self.refresh_counters();
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of invalid lines for each level
    pub fn get_invalid_line_counts(&self) -> Vec<u64> {
        self.hierarchy.levels().iter().map(|x| x.get_invalid_line_count() as u64).collect()
    }

    pub fn get_result(&self) -> &SimulationResult {
        &self.result
    }

    pub fn hierarchy(&self) -> &HierarchyManager {
        &self.hierarchy
    }

    fn refresh_counters(&mut self) {
        self.result.average_latency = ratio(self.result.total_latency, self.result.accesses);
        self.result.memory_reads = self.hierarchy.memory_reads();
        self.result.memory_writebacks = self.hierarchy.memory_writebacks();
        for (cache, res) in self.hierarchy.levels().iter().zip(&mut self.result.caches) {
            res.hits = cache.get_hit_count();
            res.misses = cache.get_miss_count();
            res.hit_rate = ratio(res.hits, res.hits + res.misses);
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
