/*!
 * System Limits and Constants
 *
 * Centralized location for capacities, thresholds and service defaults.
 * Organized by domain for discoverability.
 */

use std::time::Duration;

// =============================================================================
// MEMORY LIMITS
// =============================================================================

/// Default simulated capacity (1024 units, kilobytes by convention)
pub const DEFAULT_CAPACITY: usize = 1024;

/// Usage ratio at which memory pressure is reported as medium
pub const MEDIUM_PRESSURE_THRESHOLD: f64 = 0.60;

/// Usage ratio at which memory pressure is reported as high
pub const HIGH_PRESSURE_THRESHOLD: f64 = 0.80;

/// Usage ratio at which memory pressure is reported as critical
pub const CRITICAL_PRESSURE_THRESHOLD: f64 = 0.95;

// =============================================================================
// SERVICE LIMITS
// =============================================================================

/// Default listen address of the memory service
pub const DEFAULT_SERVICE_ADDR: &str = "127.0.0.1:8000";

/// Maximum concurrently served connections
pub const DEFAULT_MAX_CONNECTIONS: usize = 256;

/// Idle time allowed between two requests on one connection
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Longest accepted request line (64KB)
/// [SECURITY] Bounds per-connection buffering
pub const MAX_REQUEST_LINE: usize = 64 * 1024;

// =============================================================================
// WORKLOAD LIMITS
// =============================================================================

/// Allocation sizes drawn by the workload generator
pub const WORKLOAD_SIZES: [usize; 5] = [32, 64, 128, 256, 512];

/// Probability that a generated step allocates
pub const WORKLOAD_ALLOCATE_WEIGHT: f64 = 0.6;

/// Cumulative probability bound for deallocation (allocate + deallocate)
pub const WORKLOAD_DEALLOCATE_WEIGHT: f64 = 0.9;

/// Default number of generated operations
pub const DEFAULT_WORKLOAD_OPERATIONS: usize = 150;

/// Default capacity used by policy comparisons
pub const DEFAULT_WORKLOAD_CAPACITY: usize = 2048;

/// Default generator seed
pub const DEFAULT_WORKLOAD_SEED: u64 = 42;
