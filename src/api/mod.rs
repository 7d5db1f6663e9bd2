/*!
 * API Module
 * Memory service exposed as newline-delimited JSON over TCP
 */

pub mod handlers;
pub mod server;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use handlers::MemoryService;
pub use server::{start_server, MemoryServer};
pub use traits::*;
pub use types::*;
