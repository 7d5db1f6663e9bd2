/*!
 * Memory Management
 *
 * Best-fit allocator over a single linear address range `[0, total_memory)`.
 *
 * ## Representation
 *
 * - **Block list**: blocks in ascending address order that partition the whole
 *   range with no gaps or overlaps. No two neighbours are both free once a
 *   deallocation or compaction completes.
 * - **Process registry**: process name to the start address of its block. The
 *   block list owns all block state; the registry is a lookup aid resolved by
 *   binary search, so it never dangles when the list is split, merged or
 *   rebuilt.
 *
 * ## Operations
 *
 * - **Allocation**: optional power-of-two rounding, best-fit search (ties go
 *   to the lowest address), split of the chosen block
 * - **Deallocation**: release followed by coalescing of adjacent free blocks
 * - **Compaction**: allocated blocks slide to address 0 in their original
 *   order, leaving a single trailing free block
 * - **Reporting**: used/free totals, count-based fragmentation, snapshots
 */

mod allocator;
mod coalesce;
mod compaction;
mod invariants;
mod stats;

pub use allocator::rounded_request_size;

use super::traits::{Allocator, Compactor, MemoryEngine, MemoryInfo};
use super::types::{MemoryBlock, MemoryError, MemoryResult, MemoryStats, MemoryStatus};
use crate::core::limits::DEFAULT_CAPACITY;
use crate::core::types::{Address, ProcessName, Size};
use ahash::RandomState;
use log::info;
use std::collections::HashMap;

/// Memory manager
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryManager {
    pub(super) total_memory: Size,
    pub(super) blocks: Vec<MemoryBlock>,
    // Process name -> start address of the owning block
    pub(super) registry: HashMap<ProcessName, Address, RandomState>,
}

impl MemoryManager {
    pub fn new() -> Self {
        Self::fresh(DEFAULT_CAPACITY)
    }

    /// Create memory manager with custom capacity
    pub fn with_capacity(total: Size) -> MemoryResult<Self> {
        if total == 0 {
            return Err(MemoryError::InvalidCapacity(total));
        }
        Ok(Self::fresh(total))
    }

    fn fresh(total: Size) -> Self {
        info!("Memory manager initialized with {} units as a single free block", total);
        Self {
            total_memory: total,
            blocks: vec![MemoryBlock::free(0, total)],
            registry: HashMap::with_hasher(RandomState::new()),
        }
    }

    pub fn total_memory(&self) -> Size {
        self.total_memory
    }

    /// Blocks in ascending address order
    pub fn blocks(&self) -> &[MemoryBlock] {
        &self.blocks
    }

    /// Number of processes currently owning a block
    pub fn process_count(&self) -> usize {
        self.registry.len()
    }

    /// Names of live processes in address order
    pub fn processes(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| b.process_name.as_deref())
            .collect()
    }

    /// Block owned by a process
    pub fn block_of(&self, process_name: &str) -> Option<&MemoryBlock> {
        let address = *self.registry.get(process_name)?;
        self.block_index(address).map(|idx| &self.blocks[idx])
    }

    /// Index of the block starting at `address`
    pub(super) fn block_index(&self, address: Address) -> Option<usize> {
        self.blocks
            .binary_search_by_key(&address, |block| block.start)
            .ok()
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}

// Implement trait interfaces
impl Allocator for MemoryManager {
    fn allocate(
        &mut self,
        process_name: &str,
        size: Size,
        use_rounding: bool,
    ) -> MemoryResult<Address> {
        MemoryManager::allocate(self, process_name, size, use_rounding)
    }

    fn deallocate(&mut self, process_name: &str) -> MemoryResult<()> {
        MemoryManager::deallocate(self, process_name)
    }

    fn is_allocated(&self, process_name: &str) -> bool {
        self.registry.contains_key(process_name)
    }

    fn block_size(&self, process_name: &str) -> Option<Size> {
        self.block_of(process_name).map(|block| block.size)
    }
}

impl Compactor for MemoryManager {
    fn compact(&mut self) -> MemoryResult<usize> {
        MemoryManager::compact(self)
    }

    fn fragmentation_ratio(&self) -> f64 {
        MemoryManager::fragmentation_ratio(self)
    }
}

impl MemoryInfo for MemoryManager {
    fn stats(&self) -> MemoryStats {
        MemoryManager::stats(self)
    }

    fn status(&self) -> MemoryStatus {
        MemoryManager::status(self)
    }

    fn info(&self) -> (Size, Size, Size) {
        MemoryManager::info(self)
    }
}

impl MemoryEngine for MemoryManager {
    fn reset(&mut self, new_capacity: Option<Size>) -> MemoryResult<()> {
        MemoryManager::reset(self, new_capacity)
    }
}
