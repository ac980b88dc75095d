//! Reliable Byte Transfer
//!
//! A single `read` or `write` on a stream socket may move fewer bytes than
//! asked for, or be interrupted by a signal before moving any. The helpers in
//! this module hide both:
//!
//! | Helper       | Returns                         | Peer close        |
//! |--------------|---------------------------------|-------------------|
//! | `send_all`   | bytes handed to the transport   | n/a (write error) |
//! | `recv_exact` | bytes placed in `buf`           | short count       |
//! | `recv_some`  | bytes from one successful read  | `0`               |
//!
//! Three outcomes are kept apart everywhere:
//!
//! - **Interrupted** (`ErrorKind::Interrupted`): retried, never surfaced
//! - **Peer closed**: a zero-length read, reported as a count, not an error
//! - **Error**: anything else, returned to the caller
//!
//! The helpers are generic over Tokio's I/O traits, so they work the same on
//! a `TcpStream`, an in-memory duplex pipe, or a scripted mock.

use std::io::{self, ErrorKind};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Writes every byte of `data`, in order.
///
/// Loops over partial writes and retries interrupted ones. A write that
/// accepts zero bytes without an error means the transport can make no more
/// progress; the loop stops and the short count is returned instead of
/// spinning. Callers that need the whole message compare the count with
/// `data.len()`.
pub async fn send_all<W>(writer: &mut W, data: &[u8]) -> io::Result<usize>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut total = 0;

    while total < data.len() {
        match writer.write(&data[total..]).await {
            Ok(0) => {
                trace!(sent = total, wanted = data.len(), "Write made no progress");
                break;
            }
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    loop {
        match writer.flush().await {
            Ok(()) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(total)
}

/// Reads until `buf` is full or the peer closes.
///
/// Returns the number of bytes read. A count below `buf.len()` means the
/// peer closed mid-read; that is not an error, and the caller decides what a
/// short read means.
pub async fn recv_exact<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut total = 0;

    while total < buf.len() {
        match reader.read(&mut buf[total..]).await {
            Ok(0) => {
                trace!(received = total, wanted = buf.len(), "Peer closed mid-read");
                break;
            }
            Ok(n) => total += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(total)
}

/// Performs one successful read into `buf`.
///
/// Blocks until at least one byte is available, the peer closes (`Ok(0)`),
/// or an error occurs. Never loops to fill `buf`: whatever a single read
/// yields is the unit of work.
pub async fn recv_some<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    loop {
        match reader.read(buf).await {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}
