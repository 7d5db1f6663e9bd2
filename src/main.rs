/*!
 * Memory Simulator - Service Entry Point
 *
 * Serves the best-fit memory manager over newline-delimited JSON on TCP.
 * Configuration comes from MEMSIM_* environment variables.
 */

use std::error::Error;
use tracing::{error, info};

use memsim_kernel::core::types::KernelResult;
use memsim_kernel::{init_tracing, start_server, MemoryService, ServerConfig};

async fn run() -> KernelResult<()> {
    let config = ServerConfig::from_env()?;

    let service = match config.initial_capacity {
        Some(capacity) => {
            info!(capacity, "Pre-initializing memory");
            MemoryService::with_capacity(capacity)?
        }
        None => {
            info!("Memory left uninitialized until the first initialize request");
            MemoryService::new()
        }
    };

    info!(
        addr = %config.address,
        max_connections = config.max_connections,
        timeout_secs = config.request_timeout.as_secs(),
        "Starting memory service"
    );
    info!("Press Ctrl+C to exit");

    start_server(config, service).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize structured tracing
    init_tracing();

    info!("Memory simulator starting...");
    info!("================================================");

    if let Err(e) = run().await {
        error!(error = %e, error_type = e.error_type(), "Memory simulator failed");
        return Err(e.into());
    }

    info!("Memory simulator shut down cleanly");
    Ok(())
}
