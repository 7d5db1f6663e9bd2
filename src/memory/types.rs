/*!
 * Memory Types
 * Common types for memory management
 */

use crate::core::limits::{
    CRITICAL_PRESSURE_THRESHOLD, HIGH_PRESSURE_THRESHOLD, MEDIUM_PRESSURE_THRESHOLD,
};
use crate::core::types::{Address, ProcessName, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
///
/// Every variant is an expected outcome. The manager is left exactly as it was
/// before the failed call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MemoryError {
    #[error("Process '{0}' already allocated")]
    #[diagnostic(
        code(memory::duplicate_process),
        help("Deallocate the existing process first or choose another name.")
    )]
    DuplicateProcess(ProcessName),

    #[error("No suitable free block found for {requested} units ({free} free, largest hole {largest_free}). Try compaction.")]
    #[diagnostic(
        code(memory::no_suitable_block),
        help("Compaction merges scattered holes when enough total memory is free.")
    )]
    NoSuitableBlock {
        requested: Size,
        free: Size,
        largest_free: Size,
    },

    #[error("Process '{0}' not found")]
    #[diagnostic(code(memory::process_not_found))]
    ProcessNotFound(ProcessName),

    #[error("No allocated blocks to compact")]
    #[diagnostic(code(memory::nothing_to_compact))]
    NothingToCompact,

    #[error("Invalid capacity: {0} (must be positive)")]
    #[diagnostic(code(memory::invalid_capacity))]
    InvalidCapacity(Size),

    #[error("Invalid allocation size: {0} (must be positive)")]
    #[diagnostic(
        code(memory::invalid_size),
        help("Zero-sized requests are only accepted with power-of-two rounding.")
    )]
    InvalidSize(Size),

    #[error("Invalid process name: must not be empty")]
    #[diagnostic(code(memory::invalid_process_name))]
    InvalidProcessName,

    #[error("Memory corruption detected: {0}")]
    #[diagnostic(
        code(memory::corruption_detected),
        help("The block list no longer partitions the address range. Please report this issue.")
    )]
    CorruptionDetected(String),
}

/// A maximal contiguous run of memory, free or owned by one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBlock {
    pub start: Address,
    pub size: Size,
    pub is_free: bool,
    pub process_name: Option<ProcessName>,
}

impl MemoryBlock {
    pub fn free(start: Address, size: Size) -> Self {
        Self {
            start,
            size,
            is_free: true,
            process_name: None,
        }
    }

    pub fn allocated(start: Address, size: Size, process_name: impl Into<ProcessName>) -> Self {
        Self {
            start,
            size,
            is_free: false,
            process_name: Some(process_name.into()),
        }
    }

    /// One past the last address covered by the block
    pub fn end(&self) -> Address {
        self.start + self.size
    }

    pub fn is_allocated(&self) -> bool {
        !self.is_free
    }

    pub(crate) fn assign(&mut self, process_name: impl Into<ProcessName>) {
        self.is_free = false;
        self.process_name = Some(process_name.into());
    }

    pub(crate) fn release(&mut self) {
        self.is_free = true;
        self.process_name = None;
    }
}

impl std::fmt::Display for MemoryBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.process_name {
            Some(name) if !self.is_free => write!(
                f,
                "Block[{}-{}]: {} ALLOCATED({})",
                self.start,
                self.end(),
                self.size,
                name
            ),
            _ => write!(f, "Block[{}-{}]: {} FREE", self.start, self.end(), self.size),
        }
    }
}

/// Serialized view of a block, carrying the derived end address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub start: Address,
    pub size: Size,
    pub end: Address,
    pub is_free: bool,
    pub process_name: Option<ProcessName>,
}

impl From<&MemoryBlock> for BlockSnapshot {
    fn from(block: &MemoryBlock) -> Self {
        Self {
            start: block.start,
            size: block.size,
            end: block.end(),
            is_free: block.is_free,
            process_name: block.process_name.clone(),
        }
    }
}

/// Read-only projection of the manager for external consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStatus {
    pub total_memory: Size,
    pub used_memory: Size,
    pub free_memory: Size,
    pub blocks: Vec<BlockSnapshot>,
    pub active_processes: usize,
    /// Count-based ratio in `[0, 1)`
    pub fragmentation_ratio: f64,
    /// Same ratio as a percentage rounded to two decimals
    pub fragmentation: f64,
}

/// Memory statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_memory: Size,
    pub used_memory: Size,
    pub free_memory: Size,
    pub usage_percentage: f64,
    pub block_count: usize,
    pub allocated_blocks: usize,
    pub free_blocks: usize,
    pub largest_free_block: Size,
    pub fragmentation_ratio: f64,
}

impl MemoryStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        MemoryPressure::from_ratio(self.usage_percentage / 100.0)
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    pub fn from_ratio(usage_ratio: f64) -> Self {
        if usage_ratio >= CRITICAL_PRESSURE_THRESHOLD {
            MemoryPressure::Critical
        } else if usage_ratio >= HIGH_PRESSURE_THRESHOLD {
            MemoryPressure::High
        } else if usage_ratio >= MEDIUM_PRESSURE_THRESHOLD {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
