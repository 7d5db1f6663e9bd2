/*!
 * Core Types
 * Common types used across the kernel
 */

/// Offset into the simulated address range, in capacity units
pub type Address = usize;

/// Length in capacity units (kilobytes in the default configuration)
pub type Size = usize;

/// Name identifying a process that owns a block
pub type ProcessName = String;

/// Common result type for kernel operations
pub type KernelResult<T> = Result<T, super::errors::KernelError>;
