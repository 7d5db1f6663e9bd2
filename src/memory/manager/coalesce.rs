/*!
 * Deallocation and Coalescing
 * Releasing blocks and merging neighbouring free space
 */

use super::super::types::{MemoryBlock, MemoryError, MemoryResult};
use super::MemoryManager;
use log::{debug, info, warn};

impl MemoryManager {
    /// Release the block owned by `process_name` and merge adjacent free space
    pub fn deallocate(&mut self, process_name: &str) -> MemoryResult<()> {
        let Some(&address) = self.registry.get(process_name) else {
            warn!("Attempted to deallocate unknown process '{}'", process_name);
            return Err(MemoryError::ProcessNotFound(process_name.to_string()));
        };

        // Resolve before mutating so a stale registry entry leaves state untouched
        let idx = self
            .block_index(address)
            .filter(|&idx| self.blocks[idx].process_name.as_deref() == Some(process_name))
            .ok_or_else(|| {
                MemoryError::CorruptionDetected(format!(
                    "registry maps '{}' to {} but no block there is owned by it",
                    process_name, address
                ))
            })?;

        let size = self.blocks[idx].size;
        self.blocks[idx].release();
        self.registry.remove(process_name);

        let merged = self.coalesce_adjacent_free();
        info!(
            "Deallocated {} units at {} from '{}' ({} free, {} blocks merged)",
            size,
            address,
            process_name,
            self.free_memory(),
            merged
        );

        self.debug_verify();
        Ok(())
    }

    /// Collapse every run of consecutive free blocks into one block
    ///
    /// Returns how many blocks were absorbed. Allocated blocks keep their
    /// position, so registry addresses stay valid.
    pub(super) fn coalesce_adjacent_free(&mut self) -> usize {
        let before = self.blocks.len();
        if before < 2 {
            return 0;
        }

        let mut merged: Vec<MemoryBlock> = Vec::with_capacity(before);
        for block in self.blocks.drain(..) {
            match merged.last_mut() {
                Some(prev) if prev.is_free && block.is_free => prev.size += block.size,
                _ => merged.push(block),
            }
        }
        self.blocks = merged;

        let absorbed = before - self.blocks.len();
        if absorbed > 0 {
            debug!(
                "Coalesced {} adjacent free blocks, reduced from {} to {} blocks",
                absorbed,
                before,
                self.blocks.len()
            );
        }
        absorbed
    }
}
