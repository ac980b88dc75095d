//! Client Worker
//!
//! One worker performs one exchange: connect, send its message in full,
//! read back as many bytes as it sent, and report. The echo protocol keeps
//! response length equal to request length, which is what lets the worker
//! know when the response is complete without any framing.

use crate::transfer::{recv_exact, send_all};
use bytes::{Bytes, BytesMut};
use std::fmt;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tracing::debug;

/// One worker's task: a sequence index and the message to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    index: usize,
    message: String,
}

impl WorkItem {
    pub fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The five built-in messages, numbered from 1.
pub fn default_work_items() -> Vec<WorkItem> {
    [
        "hello server",
        "shnkar systems programming",
        "multi threaded client",
        "echo test 123",
        "good luck!",
    ]
    .into_iter()
    .enumerate()
    .map(|(i, message)| WorkItem::new(i + 1, message))
    .collect()
}

/// A completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub index: usize,
    pub sent: String,
    pub received: Bytes,
}

impl WorkerReport {
    /// The response decoded as text, with invalid UTF-8 replaced.
    pub fn received_text(&self) -> String {
        String::from_utf8_lossy(&self.received).into_owned()
    }
}

impl fmt::Display for WorkerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Client #{}] sent: \"{}\" | got: \"{}\"",
            self.index,
            self.sent,
            self.received_text()
        )
    }
}

/// Errors that end a single worker.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("send: {0}")]
    Send(#[source] std::io::Error),

    #[error("send: only {sent} of {len} bytes accepted")]
    ShortSend { sent: usize, len: usize },

    #[error("recv: {0}")]
    Recv(#[source] std::io::Error),

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Number of response bytes to wait for: the request length, held one byte
/// below the buffer capacity.
pub fn expected_response_len(message_len: usize, capacity: usize) -> usize {
    message_len.min(capacity.saturating_sub(1))
}

/// Runs one exchange against the server at `addr`.
///
/// If the server closes early, the report carries the shorter response
/// instead of failing.
pub async fn run_worker(
    addr: SocketAddr,
    item: &WorkItem,
    response_capacity: usize,
) -> Result<WorkerReport, ClientError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ClientError::Connect { addr, source })?;

    let request = item.message().as_bytes();
    let sent = send_all(&mut stream, request)
        .await
        .map_err(ClientError::Send)?;
    if sent < request.len() {
        return Err(ClientError::ShortSend {
            sent,
            len: request.len(),
        });
    }

    let need = expected_response_len(request.len(), response_capacity);
    let mut response = BytesMut::zeroed(need);
    let got = recv_exact(&mut stream, &mut response[..])
        .await
        .map_err(ClientError::Recv)?;
    response.truncate(got);

    debug!(index = item.index(), sent, received = got, "Exchange complete");

    Ok(WorkerReport {
        index: item.index(),
        sent: item.message().to_string(),
        received: response.freeze(),
    })
}
