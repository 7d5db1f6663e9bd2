/*!
 * Workload Simulation
 * Replays operations against an engine and records its state after each step
 */

use super::generator::Operation;
use crate::core::types::Size;
use crate::memory::MemoryEngine;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Time series and counters collected during one simulation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub used_memory: Vec<Size>,
    pub free_memory: Vec<Size>,
    /// Fragmentation percentage after each step
    pub fragmentation: Vec<f64>,
    pub blocks_count: Vec<usize>,
    pub successful_allocations: usize,
    pub failed_allocations: usize,
    pub deallocations: usize,
    pub compactions: usize,
}

impl SimulationStats {
    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.used_memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used_memory.is_empty()
    }
}

/// Apply `operations` to `engine`, recording used/free memory,
/// fragmentation and block count after every step
///
/// Failed operations are counted, never fatal.
pub fn simulate<E: MemoryEngine>(
    engine: &mut E,
    operations: &[Operation],
    use_rounding: bool,
) -> SimulationStats {
    let mut stats = SimulationStats::default();

    for (step, operation) in operations.iter().enumerate() {
        match operation {
            Operation::Allocate { process_name, size } => {
                match engine.allocate(process_name, *size, use_rounding) {
                    Ok(_) => stats.successful_allocations += 1,
                    Err(e) => {
                        debug!(step, error = %e, "simulated allocation failed");
                        stats.failed_allocations += 1;
                    }
                }
            }
            Operation::Deallocate { process_name } => {
                if engine.deallocate(process_name).is_ok() {
                    stats.deallocations += 1;
                }
            }
            Operation::Compact => {
                if engine.compact().is_ok() {
                    stats.compactions += 1;
                }
            }
        }

        let snapshot = engine.stats();
        stats.used_memory.push(snapshot.used_memory);
        stats.free_memory.push(snapshot.free_memory);
        stats.fragmentation.push(snapshot.fragmentation_ratio * 100.0);
        stats.blocks_count.push(snapshot.block_count);
    }

    stats
}
