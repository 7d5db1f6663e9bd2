/*!
 * Memory Simulator Kernel Library
 * Best-fit memory manager, its network service and workload tooling
 */

pub mod api;
pub mod core;
pub mod memory;
pub mod monitoring;
pub mod workload;

// Re-exports
pub use api::{start_server, MemoryServer, MemoryService, Reply, Request, ServerConfig};
pub use crate::core::errors::{KernelError, SerializableError};
pub use memory::{
    Allocator, Compactor, MemoryEngine, MemoryError, MemoryInfo, MemoryManager, MemoryResult,
    MemoryStats, MemoryStatus,
};
pub use monitoring::init_tracing;
pub use workload::{compare_policies, simulate, Operation, WorkloadGenerator};
