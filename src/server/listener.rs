//! TCP Listener
//!
//! Binds the well-known address, then accepts connections forever, handing
//! each one to a detached task. The listener never touches connection I/O
//! and never waits for a handler; cleanup is the handler's job.
//!
//! Failure policy:
//!
//! - An unusable config (bad address, empty buffer) or socket setup
//!   (create, `SO_REUSEADDR`, bind, listen) failing is fatal.
//! - An interrupted `accept` is retried; any other `accept` error is fatal.
//! - With every connection slot taken, a new connection is closed right
//!   away and the listener keeps going.

use crate::config::ServerConfig;
use crate::server::handler::handle_connection;
use crate::server::stats::ConnectionStats;
use std::io::ErrorKind;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Errors that stop the listener. All of them end the process.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid listen address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("buffer size must be at least one byte")]
    InvalidBufferSize,

    #[error("socket: {0}")]
    Socket(#[source] std::io::Error),

    #[error("setsockopt(SO_REUSEADDR): {0}")]
    ReuseAddr(#[source] std::io::Error),

    #[error("bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("listen: {0}")]
    Listen(#[source] std::io::Error),

    #[error("accept: {0}")]
    Accept(#[source] std::io::Error),
}

/// A bound echo server.
pub struct EchoServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: ServerConfig,
    stats: Arc<ConnectionStats>,
    connection_limit: Arc<Semaphore>,
}

impl EchoServer {
    /// Creates the listening socket described by `config`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        if config.buffer_size == 0 {
            return Err(ServerError::InvalidBufferSize);
        }

        let addr = config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                address: config.bind_address(),
                source,
            })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(ServerError::Socket)?;

        socket.set_reuseaddr(true).map_err(ServerError::ReuseAddr)?;
        socket
            .bind(addr)
            .map_err(|source| ServerError::Bind { addr, source })?;

        let listener = socket.listen(config.backlog).map_err(ServerError::Listen)?;
        let local_addr = listener.local_addr().map_err(ServerError::Listen)?;

        info!(address = %local_addr, backlog = config.backlog, "Server listening");

        Ok(Self {
            listener,
            local_addr,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
            config,
            stats: Arc::new(ConnectionStats::new()),
        })
    }

    /// The address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Statistics shared with every connection this server spawns.
    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    /// Runs the accept loop. Only returns on a fatal accept error.
    pub async fn run(self) -> Result<(), ServerError> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                    return Err(ServerError::Accept(e));
                }
            };

            let permit = match Arc::clone(&self.connection_limit).try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    self.stats.connection_rejected();
                    warn!(
                        client = %peer,
                        limit = self.config.max_connections,
                        "Connection limit reached, dropping connection"
                    );
                    drop(stream);
                    continue;
                }
            };

            let stats = Arc::clone(&self.stats);
            let buffer_size = self.config.buffer_size;

            tokio::spawn(async move {
                let guard = stats.register(peer);
                let _ = handle_connection(stream, guard, buffer_size).await;
                drop(permit);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn test_config() -> ServerConfig {
        ServerConfig {
            port: 0,
            ..Default::default()
        }
    }

    async fn start_server(config: ServerConfig) -> (SocketAddr, Arc<ConnectionStats>) {
        let server = EchoServer::bind(config).unwrap();
        let addr = server.local_addr();
        let stats = server.stats();
        tokio::spawn(server.run());
        (addr, stats)
    }

    async fn wait_for_active(stats: &ConnectionStats, expected: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while stats.active() != expected && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(stats.active(), expected);
    }

    #[tokio::test]
    async fn test_echo_over_tcp() {
        let (addr, _) = start_server(test_config()).await;

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"hello server").await.unwrap();

        let mut buf = [0u8; 12];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"HELLO SERVER");
    }

    #[tokio::test]
    async fn test_counter_tracks_open_connections() {
        let (addr, stats) = start_server(test_config()).await;
        assert_eq!(stats.active(), 0);

        let mut clients = Vec::new();
        for _ in 0..3 {
            clients.push(TcpStream::connect(addr).await.unwrap());
        }
        wait_for_active(&stats, 3).await;

        clients.pop();
        wait_for_active(&stats, 2).await;

        clients.clear();
        wait_for_active(&stats, 0).await;

        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_independent_listeners() {
        let (addr_a, stats_a) = start_server(test_config()).await;
        let (addr_b, stats_b) = start_server(test_config()).await;
        assert_ne!(addr_a, addr_b);

        let _client = TcpStream::connect(addr_a).await.unwrap();
        wait_for_active(&stats_a, 1).await;
        assert_eq!(stats_b.active(), 0);
    }

    #[tokio::test]
    async fn test_connection_limit_drops_extra_clients() {
        let config = ServerConfig {
            max_connections: 1,
            ..test_config()
        };
        let (addr, stats) = start_server(config).await;

        let mut first = TcpStream::connect(addr).await.unwrap();
        wait_for_active(&stats, 1).await;

        let mut second = TcpStream::connect(addr).await.unwrap();
        let mut buf = [0u8; 8];
        let result = tokio::time::timeout(Duration::from_secs(2), second.read(&mut buf))
            .await
            .unwrap();
        assert!(matches!(result, Ok(0) | Err(_)));
        assert_eq!(stats.connections_rejected.load(Ordering::Relaxed), 1);

        // The admitted connection still works.
        first.write_all(b"still here").await.unwrap();
        let mut buf = [0u8; 10];
        first.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"STILL HERE");
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let config = ServerConfig {
            host: "localhost-ish".to_string(),
            ..test_config()
        };
        let err = EchoServer::bind(config).err().unwrap();
        assert!(matches!(err, ServerError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_zero_buffer_size_rejected() {
        let config = ServerConfig {
            buffer_size: 0,
            ..test_config()
        };
        let err = EchoServer::bind(config).err().unwrap();
        assert!(matches!(err, ServerError::InvalidBufferSize));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_bind_conflict_is_fatal() {
        let first = EchoServer::bind(test_config()).unwrap();
        let config = ServerConfig {
            port: first.local_addr().port(),
            ..test_config()
        };

        let err = EchoServer::bind(config).err().unwrap();
        assert!(matches!(err, ServerError::Bind { .. }));
    }
}
