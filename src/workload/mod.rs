/*!
 * Workload Module
 * Synthetic workloads driven against the memory engine for offline analysis
 */

pub mod analysis;
pub mod export;
pub mod generator;
pub mod simulation;

// Re-export for convenience
pub use analysis::{analyze, compare_policies, PerformanceMetrics, PolicyComparison, PolicyRun};
pub use export::{render_memory_map, render_report, write_csv};
pub use generator::{Operation, WorkloadGenerator};
pub use simulation::{simulate, SimulationStats};
