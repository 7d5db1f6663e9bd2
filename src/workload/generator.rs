/*!
 * Workload Generator
 * Seeded random sequences of allocate/deallocate/compact operations
 */

use crate::core::limits::{WORKLOAD_ALLOCATE_WEIGHT, WORKLOAD_DEALLOCATE_WEIGHT, WORKLOAD_SIZES};
use crate::core::types::{ProcessName, Size};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// One step of a workload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Allocate { process_name: ProcessName, size: Size },
    Deallocate { process_name: ProcessName },
    Compact,
}

/// Random workload source skewed toward allocation
///
/// Each step allocates with probability 0.6 (always while nothing is live),
/// deallocates a random live process with probability 0.3, and compacts
/// otherwise. The same seed always yields the same operations.
pub struct WorkloadGenerator {
    rng: StdRng,
    sizes: Vec<Size>,
}

impl WorkloadGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            sizes: WORKLOAD_SIZES.to_vec(),
        }
    }

    /// Replace the pool allocation sizes are drawn from
    pub fn with_sizes(mut self, sizes: &[Size]) -> Self {
        if !sizes.is_empty() {
            self.sizes = sizes.to_vec();
        }
        self
    }

    pub fn generate(&mut self, count: usize) -> Vec<Operation> {
        let mut operations = Vec::with_capacity(count);
        let mut live: Vec<ProcessName> = Vec::new();

        for step in 0..count {
            let roll: f64 = self.rng.gen();

            if roll < WORKLOAD_ALLOCATE_WEIGHT || live.is_empty() {
                let process_name = format!("P{}", step);
                let size = *self.sizes.choose(&mut self.rng).unwrap_or(&WORKLOAD_SIZES[0]);
                live.push(process_name.clone());
                operations.push(Operation::Allocate { process_name, size });
            } else if roll < WORKLOAD_DEALLOCATE_WEIGHT {
                let victim = self.rng.gen_range(0..live.len());
                let process_name = live.swap_remove(victim);
                operations.push(Operation::Deallocate { process_name });
            } else {
                operations.push(Operation::Compact);
            }
        }

        operations
    }
}
