//! Configuration
//!
//! Both processes run from compiled-in defaults. The values live in typed
//! structs rather than bare constants so tests can start several independent
//! listeners on ephemeral ports and point clients at them.

use crate::{BUFFER_SIZE, DEFAULT_HOST, DEFAULT_PORT};
use std::net::{AddrParseError, SocketAddr};

/// Listen backlog passed to `listen(2)`
pub const DEFAULT_BACKLOG: u32 = 16;

/// Upper bound on concurrently serviced connections
pub const DEFAULT_MAX_CONNECTIONS: usize = 10_000;

/// Listener configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on (0 picks an ephemeral port)
    pub port: u16,
    /// Pending-connection queue length
    pub backlog: u32,
    /// Size of each connection's scratch buffer; `EchoServer::bind` rejects 0
    pub buffer_size: usize,
    /// Connections beyond this are dropped right after accept
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            backlog: DEFAULT_BACKLOG,
            buffer_size: BUFFER_SIZE,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ServerConfig {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the bind address. Only numeric hosts are accepted.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_address().parse()
    }
}

/// Client driver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Capacity of each worker's response buffer; one byte is held back
    pub response_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            response_capacity: BUFFER_SIZE,
        }
    }
}

impl ClientConfig {
    /// Points a client at an already-bound server address.
    pub fn for_addr(addr: SocketAddr) -> Self {
        Self {
            host: addr.ip().to_string(),
            port: addr.port(),
            ..Self::default()
        }
    }

    /// Returns the server address as a string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the server address. Only numeric hosts are accepted.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.server_address().parse()
    }
}
