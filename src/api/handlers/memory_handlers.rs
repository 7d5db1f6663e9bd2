/*!
 * Memory operation handlers
 *
 * Each handler maps one request onto one engine call and replies with the
 * resulting status snapshot. Engine failures become `success: false`
 * responses; only a missing engine is an API error.
 */

use crate::api::types::{ApiError, ApiResult, MemoryResponse, Reply};
use crate::core::types::Size;
use crate::memory::MemoryManager;
use tracing::{info, warn};

fn require(engine: &Option<MemoryManager>) -> ApiResult<&MemoryManager> {
    engine.as_ref().ok_or_else(not_initialized)
}

fn require_mut(engine: &mut Option<MemoryManager>) -> ApiResult<&mut MemoryManager> {
    engine.as_mut().ok_or_else(not_initialized)
}

fn not_initialized() -> ApiError {
    ApiError::FailedPrecondition("Memory not initialized. Call initialize first.".to_string())
}

pub fn handle_initialize(engine: &mut Option<MemoryManager>, total_memory: Size) -> ApiResult<Reply> {
    let manager = MemoryManager::with_capacity(total_memory)
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    if engine.is_some() {
        info!(total_memory, "Replacing existing memory manager");
    }
    let status = manager.status();
    *engine = Some(manager);

    info!(total_memory, "Memory initialized");
    Ok(Reply::Memory(MemoryResponse::success(
        format!("Memory initialized with {} KB", total_memory),
        status,
    )))
}

pub fn handle_allocate(
    engine: &mut Option<MemoryManager>,
    process_name: &str,
    size: Size,
    use_buddy: bool,
) -> ApiResult<Reply> {
    let manager = require_mut(engine)?;

    let response = match manager.allocate(process_name, size, use_buddy) {
        Ok(address) => {
            let reserved = manager.block_of(process_name).map_or(size, |b| b.size);
            info!(process_name, size, reserved, address, "Allocation succeeded");
            MemoryResponse::success(
                format!("Process '{}' allocated {}KB", process_name, reserved),
                manager.status(),
            )
            .with_start_address(address)
        }
        Err(e) => {
            warn!(process_name, size, error = %e, "Allocation failed");
            MemoryResponse::failure(e.to_string(), manager.status())
        }
    };
    Ok(Reply::Memory(response))
}

pub fn handle_deallocate(engine: &mut Option<MemoryManager>, process_name: &str) -> ApiResult<Reply> {
    let manager = require_mut(engine)?;

    let response = match manager.deallocate(process_name) {
        Ok(()) => {
            info!(process_name, "Deallocation succeeded");
            MemoryResponse::success(
                format!("Process '{}' deallocated", process_name),
                manager.status(),
            )
        }
        Err(e) => {
            warn!(process_name, error = %e, "Deallocation failed");
            MemoryResponse::failure(e.to_string(), manager.status())
        }
    };
    Ok(Reply::Memory(response))
}

pub fn handle_compact(engine: &mut Option<MemoryManager>) -> ApiResult<Reply> {
    let manager = require_mut(engine)?;

    let response = match manager.compact() {
        Ok(moved) => {
            info!(moved, "Compaction succeeded");
            MemoryResponse::success("Memory compacted successfully", manager.status())
                .with_moved_processes(moved)
        }
        Err(e) => {
            warn!(error = %e, "Compaction failed");
            MemoryResponse::failure(e.to_string(), manager.status()).with_moved_processes(0)
        }
    };
    Ok(Reply::Memory(response))
}

pub fn handle_status(engine: &Option<MemoryManager>) -> ApiResult<Reply> {
    let manager = require(engine)?;
    Ok(Reply::Memory(MemoryResponse::success(
        "Memory status",
        manager.status(),
    )))
}

pub fn handle_reset(engine: &mut Option<MemoryManager>, total_memory: Option<Size>) -> ApiResult<Reply> {
    let manager = require_mut(engine)?;

    let response = match manager.reset(total_memory) {
        Ok(()) => {
            info!(total_memory = manager.total_memory(), "Memory reset");
            MemoryResponse::success("Memory reset successfully", manager.status())
        }
        Err(e) => {
            warn!(error = %e, "Reset failed");
            MemoryResponse::failure(e.to_string(), manager.status())
        }
    };
    Ok(Reply::Memory(response))
}
