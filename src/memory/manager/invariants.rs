/*!
 * Invariant Checking
 * Structural validation of the block list and process registry
 */

use super::super::types::{MemoryError, MemoryResult};
use super::MemoryManager;
use crate::core::types::Address;

impl MemoryManager {
    /// Verify the block list partitions `[0, total_memory)`, free space is
    /// fully coalesced, and the registry mirrors block ownership
    pub fn check_invariants(&self) -> MemoryResult<()> {
        let corrupt = |msg: String| -> MemoryResult<()> { Err(MemoryError::CorruptionDetected(msg)) };

        let mut expected_start: Address = 0;
        let mut previous_free = false;
        let mut owners = 0;

        for (idx, block) in self.blocks.iter().enumerate() {
            if block.start != expected_start {
                return corrupt(format!(
                    "block {} starts at {} but previous block ends at {}",
                    idx, block.start, expected_start
                ));
            }
            if block.size == 0 {
                return corrupt(format!("block {} at {} is empty", idx, block.start));
            }

            match (&block.process_name, block.is_free) {
                (None, true) => {
                    if previous_free {
                        return corrupt(format!("adjacent free blocks at {}", block.start));
                    }
                }
                (Some(name), false) if !name.is_empty() => {
                    if self.registry.get(name) != Some(&block.start) {
                        return corrupt(format!(
                            "block at {} owned by '{}' is missing from the registry",
                            block.start, name
                        ));
                    }
                    owners += 1;
                }
                _ => {
                    return corrupt(format!(
                        "block at {} has inconsistent ownership",
                        block.start
                    ))
                }
            }

            previous_free = block.is_free;
            expected_start = block.end();
        }

        if expected_start != self.total_memory {
            return corrupt(format!(
                "blocks end at {} but capacity is {}",
                expected_start, self.total_memory
            ));
        }
        if owners != self.registry.len() {
            return corrupt(format!(
                "registry holds {} processes but {} blocks are allocated",
                self.registry.len(),
                owners
            ));
        }
        Ok(())
    }

    /// Assert invariants after a mutation in debug builds
    #[inline]
    pub(super) fn debug_verify(&self) {
        if cfg!(debug_assertions) {
            if let Err(e) = self.check_invariants() {
                panic!("memory manager invariant violated: {}", e);
            }
        }
    }
}
