/*!
 * Handler implementations for memory service requests
 */

pub mod memory_handlers;

use crate::api::traits::RequestValidator;
use crate::api::types::{
    ApiError, ApiResult, HealthResponse, Reply, Request, ServiceInfo,
};
use crate::core::types::Size;
use crate::memory::{MemoryManager, MemoryResult, MemoryStatus};
use crate::monitoring::RequestSpan;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Shared handle to the memory engine served by one service instance
///
/// Constructed once at startup and cloned into every connection task. All
/// calls, reads included, run under a single lock, so requests are serialized
/// against the engine.
#[derive(Clone, Default)]
pub struct MemoryService {
    engine: Arc<Mutex<Option<MemoryManager>>>,
}

impl MemoryService {
    /// Service with no memory; everything but `initialize` fails until one is created
    pub fn new() -> Self {
        Self::default()
    }

    /// Service pre-initialized with an existing manager
    pub fn with_manager(manager: MemoryManager) -> Self {
        Self {
            engine: Arc::new(Mutex::new(Some(manager))),
        }
    }

    /// Service pre-initialized with a fresh manager of `capacity` units
    pub fn with_capacity(capacity: Size) -> MemoryResult<Self> {
        Ok(Self::with_manager(MemoryManager::with_capacity(capacity)?))
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.lock().is_some()
    }

    /// Consistent snapshot taken under the engine lock
    pub fn snapshot(&self) -> Option<MemoryStatus> {
        self.engine.lock().as_ref().map(MemoryManager::status)
    }

    /// Validate and execute one request
    pub fn handle(&self, request: Request) -> ApiResult<Reply> {
        let span = RequestSpan::new(request.name());
        let _guard = span.enter();

        if let Err(e) = self.validate(&request) {
            span.record_error(&e.to_string());
            return Err(e);
        }

        let mut engine = self.engine.lock();
        let result = match request {
            Request::Initialize { total_memory } => {
                memory_handlers::handle_initialize(&mut engine, total_memory)
            }
            Request::Allocate {
                process_name,
                size,
                use_buddy,
            } => memory_handlers::handle_allocate(&mut engine, &process_name, size, use_buddy),
            Request::Deallocate { process_name } => {
                memory_handlers::handle_deallocate(&mut engine, &process_name)
            }
            Request::Compact => memory_handlers::handle_compact(&mut engine),
            Request::Status => memory_handlers::handle_status(&engine),
            Request::Reset { total_memory } => {
                memory_handlers::handle_reset(&mut engine, total_memory)
            }
            Request::Health => Ok(Reply::Health(HealthResponse {
                status: "healthy".to_string(),
                memory_initialized: engine.is_some(),
            })),
            Request::Info => Ok(Reply::Info(service_info())),
        };
        drop(engine);

        match &result {
            Ok(Reply::Memory(response)) => span.record_result(response.success),
            Ok(_) => span.record_result(true),
            Err(e) => span.record_error(&e.to_string()),
        }
        info!(trace_id = %span.trace_id(), ok = result.is_ok(), "request handled");
        result
    }
}

impl RequestValidator for MemoryService {
    type Request = Request;

    fn validate(&self, request: &Request) -> ApiResult<()> {
        match request {
            Request::Initialize { total_memory } | Request::Reset { total_memory: Some(total_memory) }
                if *total_memory == 0 =>
            {
                Err(ApiError::InvalidRequest(
                    "total_memory must be greater than 0".to_string(),
                ))
            }
            Request::Allocate { size: 0, .. } => Err(ApiError::InvalidRequest(
                "size must be greater than 0".to_string(),
            )),
            Request::Allocate { process_name, .. } | Request::Deallocate { process_name }
                if process_name.is_empty() =>
            {
                Err(ApiError::InvalidRequest(
                    "process_name must not be empty".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

fn service_info() -> ServiceInfo {
    ServiceInfo {
        name: "Improvised Memory Manager".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        operations: [
            "initialize",
            "allocate",
            "deallocate",
            "compact",
            "status",
            "reset",
            "health",
            "info",
        ]
        .iter()
        .map(|op| op.to_string())
        .collect(),
    }
}
