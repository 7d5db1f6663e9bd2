/*!
 * TCP Server
 * Serves the memory service as newline-delimited JSON
 *
 * Each request is one JSON object on one line; each reply is one JSON object
 * on one line, in request order.
 */

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::api::handlers::MemoryService;
use crate::api::traits::ServerLifecycle;
use crate::api::types::{ApiError, ApiResult, Reply, Request, ServerConfig};

/// Memory service server
pub struct MemoryServer {
    config: ServerConfig,
    service: MemoryService,
    running: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
}

impl MemoryServer {
    pub fn new(config: ServerConfig, service: MemoryService) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            service,
            running: Arc::new(AtomicBool::new(false)),
            shutdown,
        }
    }

    pub fn service(&self) -> &MemoryService {
        &self.service
    }

    /// Bind the configured address
    pub async fn bind(&self) -> ApiResult<TcpListener> {
        TcpListener::bind(self.config.address).await.map_err(|e| {
            ApiError::Unavailable(format!("failed to bind {}: {}", self.config.address, e))
        })
    }

    /// Accept connections on `listener` until `stop` is called
    pub async fn serve(&self, listener: TcpListener) -> ApiResult<()> {
        let local_addr = listener
            .local_addr()
            .map_err(|e| ApiError::InternalError(format!("listener has no address: {}", e)))?;
        let limiter = Arc::new(Semaphore::new(self.config.max_connections));
        let mut shutdown = self.shutdown.subscribe();

        self.running.store(true, Ordering::SeqCst);
        info!(addr = %local_addr, max_connections = self.config.max_connections, "Memory service listening");

        loop {
            if *shutdown.borrow() {
                break;
            }

            let permit = tokio::select! {
                permit = limiter.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                _ = shutdown.changed() => break,
            };

            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, "Failed to accept connection");
                        continue;
                    }
                },
                _ = shutdown.changed() => break,
            };

            let service = self.service.clone();
            let config = self.config.clone();
            let span = info_span!("connection", peer = %peer);
            tokio::spawn(
                async move {
                    if let Err(e) = handle_connection(stream, peer, service, config).await {
                        debug!(error = %e, "Connection closed with error");
                    }
                    drop(permit);
                }
                .instrument(span),
            );
        }

        self.running.store(false, Ordering::SeqCst);
        info!(addr = %local_addr, "Memory service stopped");
        Ok(())
    }
}

impl ServerLifecycle for MemoryServer {
    fn start(&self) -> std::pin::Pin<Box<dyn std::future::Future<Output = ApiResult<()>> + Send + '_>> {
        Box::pin(async move {
            let listener = self.bind().await?;
            self.serve(listener).await
        })
    }

    fn stop(&self) -> std::pin::Pin<Box<dyn std::future::Future<Output = ApiResult<()>> + Send + '_>> {
        Box::pin(async move {
            info!("Stopping memory service");
            self.shutdown.send_replace(true);
            Ok(())
        })
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn config(&self) -> &ServerConfig {
        &self.config
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    service: MemoryService,
    config: ServerConfig,
) -> std::io::Result<()> {
    stream.set_nodelay(true)?;
    info!(peer = %peer, "Client connected");
    let (reader, writer) = stream.into_split();
    let result = serve_lines(reader, writer, &service, &config).await;
    info!(peer = %peer, "Client disconnected");
    result
}

/// Answer request lines from `reader` on `writer` until EOF, idle timeout or
/// an oversized line
pub(crate) async fn serve_lines<R, W>(
    reader: R,
    mut writer: W,
    service: &MemoryService,
    config: &ServerConfig,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut line: Vec<u8> = Vec::new();

    loop {
        line.clear();
        let limit = config.max_line_length as u64 + 1;
        let read = tokio::time::timeout(
            config.request_timeout,
            (&mut reader).take(limit).read_until(b'\n', &mut line),
        )
        .await;

        let n = match read {
            Ok(result) => result?,
            Err(_) => {
                let reply = Reply::from(ApiError::Timeout("connection idle".to_string()));
                write_reply(&mut writer, &reply).await?;
                return Ok(());
            }
        };
        if n == 0 {
            return Ok(());
        }
        if line.len() > config.max_line_length && line.last() != Some(&b'\n') {
            let reply = Reply::from(ApiError::InvalidRequest(format!(
                "request line exceeds {} bytes",
                config.max_line_length
            )));
            write_reply(&mut writer, &reply).await?;
            return Ok(());
        }

        // Bytes that are not UTF-8 are answered like any other malformed line
        let text = match std::str::from_utf8(&line) {
            Ok(text) => text.trim(),
            Err(e) => {
                let reply = Reply::from(ApiError::InvalidRequest(format!(
                    "request line is not valid UTF-8: {}",
                    e
                )));
                write_reply(&mut writer, &reply).await?;
                continue;
            }
        };
        if text.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Request>(text) {
            Ok(request) => service.handle(request).unwrap_or_else(Reply::from),
            Err(e) => Reply::from(ApiError::InvalidRequest(e.to_string())),
        };
        write_reply(&mut writer, &reply).await?;
    }
}

async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, reply: &Reply) -> std::io::Result<()> {
    let mut payload = match serde_json::to_vec(reply) {
        Ok(payload) => payload,
        Err(e) => {
            error!(error = %e, "Failed to encode reply");
            serde_json::to_vec(&Reply::from(ApiError::InternalError(e.to_string())))?
        }
    };
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await
}

/// Start the memory service on `config.address` and run until Ctrl+C
pub async fn start_server(config: ServerConfig, service: MemoryService) -> ApiResult<()> {
    let server = Arc::new(MemoryServer::new(config, service));
    let listener = server.bind().await?;

    let signal_server = Arc::clone(&server);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                let _ = signal_server.stop().await;
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    server.serve(listener).await
}
