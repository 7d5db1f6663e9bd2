/*!
 * TCP Server Tests
 * Newline-delimited JSON over a real socket
 */

use memsim_kernel::api::{MemoryServer, MemoryService, Reply, ServerConfig, ServerLifecycle};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

async fn start() -> (Arc<MemoryServer>, std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    let config = ServerConfig::new("127.0.0.1:0".parse().unwrap()).with_timeout(Duration::from_secs(5));
    let server = Arc::new(MemoryServer::new(config, MemoryService::new()));
    let listener = server.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();

    let serving = Arc::clone(&server);
    let handle = tokio::spawn(async move {
        serving.serve(listener).await.unwrap();
    });
    (server, addr, handle)
}

struct Client {
    reader: BufReader<tokio::net::tcp::OwnedReadHalf>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    async fn call(&mut self, line: &str) -> Reply {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        let mut response = String::new();
        self.reader.read_line(&mut response).await.unwrap();
        serde_json::from_str(&response).unwrap()
    }
}

#[tokio::test]
async fn test_session_over_tcp() {
    let (server, addr, handle) = start().await;
    let mut client = Client::connect(addr).await;

    let reply = client.call(r#"{"op":"status"}"#).await;
    assert!(matches!(&reply, Reply::Error { error } if error.error_type == "failed_precondition"));

    let reply = client.call(r#"{"op":"initialize","total_memory":1024}"#).await;
    assert!(matches!(&reply, Reply::Memory(r) if r.success));

    let reply = client.call(r#"{"op":"allocate","process_name":"X","size":100}"#).await;
    match reply {
        Reply::Memory(r) => {
            assert!(r.success);
            assert_eq!(r.status.used_memory, 128);
            assert_eq!(r.message, "Process 'X' allocated 128KB");
        }
        other => panic!("expected memory reply, got {:?}", other),
    }

    // A second connection sees the same engine
    let mut second = Client::connect(addr).await;
    let reply = second.call(r#"{"op":"status"}"#).await;
    assert!(matches!(&reply, Reply::Memory(r) if r.status.active_processes == 1));

    assert!(server.is_running());
    server.stop().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(!server.is_running());
}

#[tokio::test]
async fn test_unknown_op_is_invalid_request() {
    let (server, addr, handle) = start().await;
    let mut client = Client::connect(addr).await;

    let reply = client.call(r#"{"op":"defragment"}"#).await;
    assert!(matches!(&reply, Reply::Error { error } if error.error_type == "invalid_request"));

    // Connection stays usable after a bad line
    let reply = client.call(r#"{"op":"health"}"#).await;
    assert!(matches!(reply, Reply::Health(_)));

    server.stop().await.unwrap();
    handle.await.unwrap();
}
