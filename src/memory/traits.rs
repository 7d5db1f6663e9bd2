/*!
 * Memory Traits
 * Memory management abstractions
 */

use super::types::*;
use crate::core::types::{Address, Size};

/// Block allocator interface
pub trait Allocator {
    /// Reserve a block for a named process, returning its start address
    fn allocate(&mut self, process_name: &str, size: Size, use_rounding: bool)
        -> MemoryResult<Address>;

    /// Release the block owned by a process
    fn deallocate(&mut self, process_name: &str) -> MemoryResult<()>;

    /// Check if a process currently owns a block
    fn is_allocated(&self, process_name: &str) -> bool;

    /// Get the reserved size of a process's block
    fn block_size(&self, process_name: &str) -> Option<Size>;
}

/// Defragmentation interface
pub trait Compactor {
    /// Relocate allocated blocks to the start of memory, returning how many moved
    fn compact(&mut self) -> MemoryResult<usize>;

    /// Count-based fragmentation ratio in `[0, 1)`
    fn fragmentation_ratio(&self) -> f64;
}

/// Memory statistics provider
pub trait MemoryInfo {
    /// Get overall memory statistics
    fn stats(&self) -> MemoryStats;

    /// Get a full read-only snapshot of the block layout
    fn status(&self) -> MemoryStatus;

    /// Get memory info as (total, used, free)
    fn info(&self) -> (Size, Size, Size);

    /// Get memory pressure level
    fn pressure(&self) -> MemoryPressure {
        self.stats().memory_pressure()
    }
}

/// Engine interface combining allocation, compaction and reporting
pub trait MemoryEngine: Allocator + Compactor + MemoryInfo {
    /// Discard every block and process, optionally changing capacity
    fn reset(&mut self, new_capacity: Option<Size>) -> MemoryResult<()>;
}
