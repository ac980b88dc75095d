//! Connection Handler
//!
//! Each accepted connection is serviced by its own task running this loop.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! CONNECTED ── register with ConnectionStats
//!     │
//!     ▼
//! ECHOING ◄──────────────────────────────┐
//!     │  recv_some (one chunk, ≤ buffer)  │
//!     │  uppercase chunk in place         │
//!     │  send_all chunk                   │
//!     └───────────────────────────────────┘
//!     │
//!     │ zero-length read / I/O error
//!     ▼
//! CLOSED ── stream dropped, guard dropped (deregister)
//! ```
//!
//! There is no idle timeout and no message limit: a connection lives until
//! its peer closes or an I/O error ends it.

use crate::server::stats::ConnectionGuard;
use crate::transfer::{recv_some, send_all};
use crate::transform::uppercase_in_place;
use bytes::BytesMut;
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace, warn};

/// Errors that end a single connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Reading from the client failed
    #[error("receive failed: {0}")]
    Recv(#[source] std::io::Error),

    /// Writing to the client failed
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),

    /// The transport stopped accepting bytes partway through a chunk
    #[error("short send: {sent} of {len} bytes")]
    ShortSend { sent: usize, len: usize },
}

impl ConnectionError {
    /// Resets and broken pipes are routine client behavior, not faults.
    pub fn is_disconnect(&self) -> bool {
        match self {
            ConnectionError::Recv(e) | ConnectionError::Send(e) => matches!(
                e.kind(),
                ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
            ),
            ConnectionError::ShortSend { .. } => false,
        }
    }
}

/// Echoes uppercased chunks back to the peer until it disconnects.
///
/// `guard` keeps the connection registered; it is dropped together with
/// `stream` when this function returns, on every path. `buffer_size` must
/// be nonzero: a zero-length read is indistinguishable from a peer close.
pub async fn handle_connection<S>(
    stream: S,
    guard: ConnectionGuard,
    buffer_size: usize,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let peer = guard.peer();
    let result = echo_loop(stream, &guard, buffer_size).await;

    match &result {
        Ok(()) => debug!(client = %peer, "Peer closed connection"),
        Err(e) if e.is_disconnect() => {
            debug!(client = %peer, error = %e, "Connection dropped by peer")
        }
        Err(e) => warn!(client = %peer, error = %e, "Connection error"),
    }

    result
}

async fn echo_loop<S>(
    mut stream: S,
    guard: &ConnectionGuard,
    buffer_size: usize,
) -> Result<(), ConnectionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug_assert!(buffer_size > 0, "scratch buffer must not be empty");
    let mut buffer = BytesMut::zeroed(buffer_size);

    loop {
        let n = recv_some(&mut stream, &mut buffer[..])
            .await
            .map_err(ConnectionError::Recv)?;

        if n == 0 {
            return Ok(());
        }

        let chunk = &mut buffer[..n];
        uppercase_in_place(chunk);

        let sent = send_all(&mut stream, chunk)
            .await
            .map_err(ConnectionError::Send)?;
        guard.stats().bytes_echoed(sent);

        if sent < n {
            return Err(ConnectionError::ShortSend { sent, len: n });
        }

        trace!(client = %guard.peer(), bytes = n, "Echoed chunk");
    }
}
