/*!
 * Server Module
 * TCP transport for the memory service
 */

pub mod tcp_server;

pub use tcp_server::{start_server, MemoryServer};
