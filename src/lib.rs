//! # upcase-echo - A Concurrent Uppercasing TCP Echo Service
//!
//! A server accepts concurrent TCP connections and sends every chunk it
//! receives straight back with ASCII lowercase letters turned to uppercase.
//! A companion client harness opens several connections at once, sends a
//! fixed message on each, and prints what comes back.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐                ┌──────────────────────────────┐
//! │       ClientDriver       │                │          EchoServer          │
//! │                          │   connect +    │        (accept loop)         │
//! │  worker 1 ─┐             │   send_all     │              │               │
//! │  worker 2 ─┼─ one task ──┼───────────────>│   tokio::spawn per client    │
//! │  worker N ─┘  per item   │                │              ▼               │
//! │                          │<───────────────┤  recv_some → uppercase →     │
//! │  joined before exit      │   recv_exact   │  send_all   (until close)    │
//! └──────────────────────────┘                │              │               │
//!                                             │      ConnectionStats         │
//!                                             │      (Mutex<usize>)          │
//!                                             └──────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use upcase_echo::config::ServerConfig;
//! use upcase_echo::server::EchoServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = EchoServer::bind(ServerConfig::default())?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`transfer`]: send-all / receive-exact / receive-some over partial I/O
//! - [`transform`]: the ASCII uppercase transform
//! - [`server`]: listener, per-connection handler, shared connection counter
//! - [`client`]: concurrent client driver and its workers
//! - [`config`]: compiled-in defaults for both processes
//!
//! ## Wire Format
//!
//! There is none. The connection carries raw bytes; chunk boundaries mean
//! nothing. For a request of `L` bytes the server returns exactly `L` bytes.

pub mod client;
pub mod config;
pub mod server;
pub mod telemetry;
pub mod transfer;
pub mod transform;

// Re-export commonly used types for convenience
pub use client::{ClientDriver, ClientError, WorkItem, WorkerReport};
pub use config::{ClientConfig, ServerConfig};
pub use server::{ConnectionStats, EchoServer, ServerError};
pub use transfer::{recv_exact, recv_some, send_all};

/// The port both processes use by default
pub const DEFAULT_PORT: u16 = 5555;

/// The loopback address both processes use by default
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Capacity of the per-connection scratch buffer and the client response buffer
pub const BUFFER_SIZE: usize = 4096;

/// Version of upcase-echo
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
