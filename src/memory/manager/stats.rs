/*!
 * Memory Statistics
 * Derived metrics, snapshots and reset
 */

use super::super::types::{BlockSnapshot, MemoryBlock, MemoryError, MemoryResult, MemoryStats, MemoryStatus};
use super::MemoryManager;
use crate::core::types::Size;
use log::info;

impl MemoryManager {
    /// Sum of sizes of allocated blocks
    pub fn used_memory(&self) -> Size {
        self.blocks
            .iter()
            .filter(|b| b.is_allocated())
            .map(|b| b.size)
            .sum()
    }

    /// Sum of sizes of free blocks
    pub fn free_memory(&self) -> Size {
        self.blocks.iter().filter(|b| b.is_free).map(|b| b.size).sum()
    }

    pub fn free_block_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_free).count()
    }

    /// Size of the largest free hole, 0 when memory is full
    pub fn largest_free_block(&self) -> Size {
        self.blocks
            .iter()
            .filter(|b| b.is_free)
            .map(|b| b.size)
            .max()
            .unwrap_or(0)
    }

    /// `(free blocks - 1) / all blocks`, or 0 with at most one free block
    ///
    /// A count of holes rather than a measure of wasted space; analytics
    /// consumers depend on this exact scale.
    pub fn fragmentation_ratio(&self) -> f64 {
        let free_blocks = self.free_block_count();
        if free_blocks <= 1 {
            return 0.0;
        }
        (free_blocks - 1) as f64 / self.blocks.len() as f64
    }

    /// (total, used, free)
    pub fn info(&self) -> (Size, Size, Size) {
        (self.total_memory, self.used_memory(), self.free_memory())
    }

    pub fn stats(&self) -> MemoryStats {
        let used = self.used_memory();
        let free_blocks = self.free_block_count();
        MemoryStats {
            total_memory: self.total_memory,
            used_memory: used,
            free_memory: self.free_memory(),
            usage_percentage: used as f64 / self.total_memory as f64 * 100.0,
            block_count: self.blocks.len(),
            allocated_blocks: self.blocks.len() - free_blocks,
            free_blocks,
            largest_free_block: self.largest_free_block(),
            fragmentation_ratio: self.fragmentation_ratio(),
        }
    }

    pub fn status(&self) -> MemoryStatus {
        let ratio = self.fragmentation_ratio();
        MemoryStatus {
            total_memory: self.total_memory,
            used_memory: self.used_memory(),
            free_memory: self.free_memory(),
            blocks: self.blocks.iter().map(BlockSnapshot::from).collect(),
            active_processes: self.registry.len(),
            fragmentation_ratio: ratio,
            fragmentation: (ratio * 100.0 * 100.0).round() / 100.0,
        }
    }

    /// Discard all blocks and processes, optionally with a new capacity
    pub fn reset(&mut self, new_capacity: Option<Size>) -> MemoryResult<()> {
        let total = new_capacity.unwrap_or(self.total_memory);
        if total == 0 {
            return Err(MemoryError::InvalidCapacity(total));
        }

        let dropped = self.registry.len();
        self.total_memory = total;
        self.blocks = vec![MemoryBlock::free(0, total)];
        self.registry.clear();
        info!("Memory reset to {} units, {} processes discarded", total, dropped);
        Ok(())
    }
}
