/*!
 * Memory Compaction
 * Sliding allocated blocks to the bottom of memory
 */

use super::super::types::{MemoryBlock, MemoryError, MemoryResult};
use super::MemoryManager;
use crate::core::types::Address;
use log::{info, warn};

impl MemoryManager {
    /// Relocate allocated blocks contiguously from address 0
    ///
    /// Processes keep their relative order and sizes. At most one free block
    /// remains afterwards, at the end of memory. Returns the number of
    /// relocated blocks.
    pub fn compact(&mut self) -> MemoryResult<usize> {
        let allocated = self.blocks.iter().filter(|b| b.is_allocated()).count();
        if allocated == 0 {
            warn!("Compaction requested with no allocated blocks");
            return Err(MemoryError::NothingToCompact);
        }

        let holes_before = self.free_block_count();
        let mut compacted: Vec<MemoryBlock> = Vec::with_capacity(allocated + 1);
        let mut cursor: Address = 0;
        for mut block in self.blocks.drain(..).filter(|b| b.is_allocated()) {
            block.start = cursor;
            cursor += block.size;
            compacted.push(block);
        }
        if cursor < self.total_memory {
            compacted.push(MemoryBlock::free(cursor, self.total_memory - cursor));
        }
        self.blocks = compacted;

        self.registry.clear();
        for block in &self.blocks {
            if let Some(name) = &block.process_name {
                self.registry.insert(name.clone(), block.start);
            }
        }

        info!(
            "Memory compacted: {} blocks relocated, {} free holes merged into {}",
            allocated,
            holes_before,
            self.free_block_count()
        );

        self.debug_verify();
        Ok(allocated)
    }
}
