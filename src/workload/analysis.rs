/*!
 * Workload Analysis
 * Summary metrics and rounding-policy comparison
 */

use super::generator::Operation;
use super::simulation::{simulate, SimulationStats};
use crate::core::types::Size;
use crate::memory::{MemoryManager, MemoryResult};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Summary of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub average_used_memory: f64,
    pub average_free_memory: f64,
    pub average_fragmentation: f64,
    pub max_fragmentation: f64,
    pub average_blocks: f64,
    /// Percentage of attempted allocations that succeeded, 0 when none were attempted
    pub allocation_success_rate: f64,
    pub total_operations: usize,
    pub successful_allocations: usize,
    pub failed_allocations: usize,
    pub deallocations: usize,
    pub compactions: usize,
}

fn mean<T: Copy + Into<f64>>(values: &[T]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v.into()).sum::<f64>() / values.len() as f64
}

fn mean_usize(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<usize>() as f64 / values.len() as f64
}

pub fn analyze(stats: &SimulationStats) -> PerformanceMetrics {
    let attempted = stats.successful_allocations + stats.failed_allocations;
    let allocation_success_rate = if attempted > 0 {
        stats.successful_allocations as f64 / attempted as f64 * 100.0
    } else {
        0.0
    };

    PerformanceMetrics {
        average_used_memory: mean_usize(&stats.used_memory),
        average_free_memory: mean_usize(&stats.free_memory),
        average_fragmentation: mean(&stats.fragmentation),
        max_fragmentation: stats.fragmentation.iter().copied().fold(0.0, f64::max),
        average_blocks: mean_usize(&stats.blocks_count),
        allocation_success_rate,
        total_operations: stats.len(),
        successful_allocations: stats.successful_allocations,
        failed_allocations: stats.failed_allocations,
        deallocations: stats.deallocations,
        compactions: stats.compactions,
    }
}

/// Stats and metrics of one policy over a workload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRun {
    pub use_rounding: bool,
    pub stats: SimulationStats,
    pub metrics: PerformanceMetrics,
}

/// The same workload run with and without power-of-two rounding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyComparison {
    pub capacity: Size,
    pub with_rounding: PolicyRun,
    pub without_rounding: PolicyRun,
}

fn run_policy(operations: &[Operation], capacity: Size, use_rounding: bool) -> MemoryResult<PolicyRun> {
    let mut manager = MemoryManager::with_capacity(capacity)?;
    let stats = simulate(&mut manager, operations, use_rounding);
    let metrics = analyze(&stats);
    info!(
        use_rounding,
        success_rate = metrics.allocation_success_rate,
        average_fragmentation = metrics.average_fragmentation,
        "Policy simulation complete"
    );
    Ok(PolicyRun {
        use_rounding,
        stats,
        metrics,
    })
}

/// Run `operations` on two fresh managers of `capacity`, one per rounding policy
pub fn compare_policies(operations: &[Operation], capacity: Size) -> MemoryResult<PolicyComparison> {
    Ok(PolicyComparison {
        capacity,
        with_rounding: run_policy(operations, capacity, true)?,
        without_rounding: run_policy(operations, capacity, false)?,
    })
}
