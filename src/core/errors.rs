/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export subsystem errors
pub use crate::api::types::ApiError;
pub use crate::memory::MemoryError;

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Memory error: {0}")]
    #[diagnostic(transparent)]
    Memory(#[from] MemoryError),

    #[error("API error: {0}")]
    #[diagnostic(transparent)]
    Api(#[from] ApiError),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(kernel::configuration_error),
        help("Invalid configuration. Review the MEMSIM_* environment variables.")
    )]
    Configuration(String),
}

/// Serializable error representation for API responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SerializableError {
    pub error_type: String,
    pub message: String,
}

impl SerializableError {
    /// Create a new serializable error
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            message: message.into(),
        }
    }
}

impl From<ApiError> for SerializableError {
    fn from(err: ApiError) -> Self {
        SerializableError::new(err.kind(), err.to_string())
    }
}

impl KernelError {
    /// Stable snake_case name used as `error_type` in replies
    pub fn error_type(&self) -> &'static str {
        match self {
            KernelError::Memory(_) => "memory_error",
            KernelError::Api(api) => api.kind(),
            KernelError::Configuration(_) => "configuration_error",
        }
    }
}

impl From<KernelError> for SerializableError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::Api(api) => api.into(),
            other => SerializableError::new(other.error_type(), other.to_string()),
        }
    }
}
