/*!
 * API Types
 * Requests, responses, errors and configuration for the memory service
 */

use crate::core::errors::{KernelError, SerializableError};
use crate::core::limits::{
    DEFAULT_MAX_CONNECTIONS, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SERVICE_ADDR, MAX_REQUEST_LINE,
};
use crate::core::types::{Address, KernelResult, Size};
use crate::memory::MemoryStatus;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// API operation result
pub type ApiResult<T> = Result<T, ApiError>;

/// API errors
///
/// Engine failures are not API errors; they travel inside a normal response
/// with `success: false`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    #[diagnostic(code(api::invalid_request))]
    InvalidRequest(String),

    #[error("Failed precondition: {0}")]
    #[diagnostic(
        code(api::failed_precondition),
        help("Send an initialize request before any other memory operation.")
    )]
    FailedPrecondition(String),

    #[error("Service unavailable: {0}")]
    #[diagnostic(code(api::unavailable))]
    Unavailable(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(api::internal_error))]
    InternalError(String),

    #[error("Timeout: {0}")]
    #[diagnostic(code(api::timeout))]
    Timeout(String),
}

impl ApiError {
    /// Stable snake_case identifier used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::FailedPrecondition(_) => "failed_precondition",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::InternalError(_) => "internal_error",
            ApiError::Timeout(_) => "timeout",
        }
    }
}

fn default_use_buddy() -> bool {
    true
}

/// One request line, tagged by `op`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Initialize {
        total_memory: Size,
    },
    Allocate {
        process_name: String,
        size: Size,
        #[serde(default = "default_use_buddy")]
        use_buddy: bool,
    },
    Deallocate {
        process_name: String,
    },
    Compact,
    Status,
    Reset {
        #[serde(default)]
        total_memory: Option<Size>,
    },
    Health,
    Info,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::Initialize { .. } => "initialize",
            Request::Allocate { .. } => "allocate",
            Request::Deallocate { .. } => "deallocate",
            Request::Compact => "compact",
            Request::Status => "status",
            Request::Reset { .. } => "reset",
            Request::Health => "health",
            Request::Info => "info",
        }
    }
}

/// Outcome of a memory operation plus the resulting snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved_processes: Option<usize>,
    #[serde(flatten)]
    pub status: MemoryStatus,
}

impl MemoryResponse {
    pub fn success(message: impl Into<String>, status: MemoryStatus) -> Self {
        Self {
            success: true,
            message: message.into(),
            start_address: None,
            moved_processes: None,
            status,
        }
    }

    pub fn failure(message: impl Into<String>, status: MemoryStatus) -> Self {
        Self {
            success: false,
            ..Self::success(message, status)
        }
    }

    pub fn with_start_address(mut self, address: Address) -> Self {
        self.start_address = Some(address);
        self
    }

    pub fn with_moved_processes(mut self, moved: usize) -> Self {
        self.moved_processes = Some(moved);
        self
    }
}

/// Liveness report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub memory_initialized: bool,
}

/// Service description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub operations: Vec<String>,
}

/// One response line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Memory(MemoryResponse),
    Health(HealthResponse),
    Info(ServiceInfo),
    Error { error: SerializableError },
}

impl From<ApiError> for Reply {
    fn from(err: ApiError) -> Self {
        Reply::Error { error: err.into() }
    }
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: SocketAddr,
    pub max_connections: usize,
    pub request_timeout: Duration,
    pub max_line_length: usize,
    /// Capacity to initialize memory with at startup, if any
    pub initial_capacity: Option<Size>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_line_length: MAX_REQUEST_LINE,
            initial_capacity: None,
        }
    }
}

impl ServerConfig {
    pub fn new(address: SocketAddr) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    /// Build a configuration from `MEMSIM_*` environment variables
    ///
    /// - MEMSIM_ADDR: listen address (default: 127.0.0.1:8000)
    /// - MEMSIM_MAX_CONNECTIONS: concurrent connection cap
    /// - MEMSIM_TIMEOUT_SECS: idle time allowed between requests
    /// - MEMSIM_INITIAL_CAPACITY: initialize memory at startup
    pub fn from_env() -> KernelResult<Self> {
        let address = env_var("MEMSIM_ADDR").unwrap_or_else(|| DEFAULT_SERVICE_ADDR.to_string());
        let mut config = Self::new(parse_setting("MEMSIM_ADDR", &address)?);

        if let Some(max) = env_var("MEMSIM_MAX_CONNECTIONS") {
            config.max_connections = parse_setting("MEMSIM_MAX_CONNECTIONS", &max)?;
        }
        if let Some(secs) = env_var("MEMSIM_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_setting("MEMSIM_TIMEOUT_SECS", &secs)?);
        }
        if let Some(capacity) = env_var("MEMSIM_INITIAL_CAPACITY") {
            config.initial_capacity = Some(parse_setting("MEMSIM_INITIAL_CAPACITY", &capacity)?);
        }

        if config.max_connections == 0 {
            return Err(KernelError::Configuration(
                "MEMSIM_MAX_CONNECTIONS must be positive".to_string(),
            ));
        }
        if config.initial_capacity == Some(0) {
            return Err(KernelError::Configuration(
                "MEMSIM_INITIAL_CAPACITY must be positive".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: Size) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_setting<T>(key: &str, value: &str) -> KernelResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| KernelError::Configuration(format!("{}={:?}: {}", key, value, e)))
}
