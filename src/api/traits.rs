/*!
 * API Traits
 * Service abstractions
 */

use super::types::*;
use std::future::Future;
use std::pin::Pin;

/// Server lifecycle management
pub trait ServerLifecycle: Send + Sync {
    /// Bind and serve until stopped
    fn start(&self) -> Pin<Box<dyn Future<Output = ApiResult<()>> + Send + '_>>;

    /// Stop the server gracefully
    fn stop(&self) -> Pin<Box<dyn Future<Output = ApiResult<()>> + Send + '_>>;

    /// Check if server is running
    fn is_running(&self) -> bool;

    /// Get server configuration
    fn config(&self) -> &ServerConfig;
}

/// Request validation
pub trait RequestValidator: Send + Sync {
    type Request;

    /// Validate an incoming request before it reaches the engine
    fn validate(&self, request: &Self::Request) -> ApiResult<()>;
}
