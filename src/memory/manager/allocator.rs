/*!
 * Memory Allocator Implementation
 * Best-fit search and block splitting
 */

use super::super::types::{MemoryBlock, MemoryError, MemoryPressure, MemoryResult};
use super::MemoryManager;
use crate::core::types::{Address, Size};
use log::{info, warn};

/// Size actually reserved for a request
///
/// With rounding the request grows to the next power of two (buddy-style
/// sizing); a zero request becomes 1. Returns `None` when the next power of
/// two is not representable in `Size`.
pub fn rounded_request_size(requested: Size, use_rounding: bool) -> Option<Size> {
    if !use_rounding {
        return Some(requested);
    }
    if requested == 0 {
        return Some(1);
    }
    requested.checked_next_power_of_two()
}

impl MemoryManager {
    fn no_suitable_block(&self, process_name: &str, requested: Size) -> MemoryError {
        let free = self.free_memory();
        let largest_free = self.largest_free_block();
        warn!(
            "No free block fits {} units for '{}' ({} free, largest hole {})",
            requested, process_name, free, largest_free
        );
        MemoryError::NoSuitableBlock {
            requested,
            free,
            largest_free,
        }
    }

    /// Index of the smallest free block holding at least `size` units
    ///
    /// Blocks are scanned in address order and a candidate only replaces the
    /// current best when strictly smaller, so equal-sized holes resolve to the
    /// lowest address.
    pub fn find_best_fit(&self, size: Size) -> Option<usize> {
        let mut best: Option<(usize, Size)> = None;
        for (idx, block) in self.blocks.iter().enumerate() {
            if !block.is_free || block.size < size {
                continue;
            }
            match best {
                Some((_, best_size)) if block.size >= best_size => {}
                _ => best = Some((idx, block.size)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Allocate a block for `process_name`, returning its start address
    ///
    /// The chosen hole is consumed whole when it matches the reserved size,
    /// otherwise split into an allocated prefix and a free remainder. No
    /// coalescing happens here.
    pub fn allocate(
        &mut self,
        process_name: &str,
        requested: Size,
        use_rounding: bool,
    ) -> MemoryResult<Address> {
        if process_name.is_empty() {
            return Err(MemoryError::InvalidProcessName);
        }
        if self.registry.contains_key(process_name) {
            warn!("Rejected allocation: process '{}' already owns a block", process_name);
            return Err(MemoryError::DuplicateProcess(process_name.to_string()));
        }

        let actual_size = match rounded_request_size(requested, use_rounding) {
            Some(0) => return Err(MemoryError::InvalidSize(requested)),
            Some(size) => size,
            // No power of two that large exists, so no block can hold it
            None => return Err(self.no_suitable_block(process_name, requested)),
        };

        let idx = match self.find_best_fit(actual_size) {
            Some(idx) => idx,
            None => return Err(self.no_suitable_block(process_name, actual_size)),
        };

        let block = &mut self.blocks[idx];
        let address = block.start;
        if block.size > actual_size {
            let remainder = MemoryBlock::free(address + actual_size, block.size - actual_size);
            block.size = actual_size;
            block.assign(process_name);
            self.blocks.insert(idx + 1, remainder);
        } else {
            block.assign(process_name);
        }
        self.registry.insert(process_name.to_string(), address);

        let used = self.used_memory();
        let pressure = MemoryPressure::from_ratio(used as f64 / self.total_memory as f64);
        if pressure >= MemoryPressure::High {
            warn!(
                "Memory pressure {}: allocated {} units at {} for '{}' ({} / {} used)",
                pressure, actual_size, address, process_name, used, self.total_memory
            );
        } else {
            info!(
                "Allocated {} units at {} for '{}' (requested {})",
                actual_size, address, process_name, requested
            );
        }

        self.debug_verify();
        Ok(address)
    }
}
