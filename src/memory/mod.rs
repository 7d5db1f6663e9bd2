/*!
 * Memory Module
 * Best-fit block allocator with optional power-of-two sizing and compaction
 */

pub mod manager;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use manager::{rounded_request_size, MemoryManager};
pub use traits::*;
pub use types::*;
