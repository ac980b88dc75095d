//! Shared Connection Counter
//!
//! The only state shared between connection tasks. The live connection
//! count sits behind a `Mutex`: it is read and written only while the lock
//! is held, and every log line reports the value observed under the lock.
//!
//! Registration is tied to a [`ConnectionGuard`]. Creating a guard
//! increments the count; dropping it decrements. Because the decrement
//! lives in `Drop`, it happens exactly once on every exit path of the
//! handler that owns the guard.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Connection statistics shared by one listener and its handlers.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Currently open server-side connections
    active: Mutex<usize>,
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Connections dropped because the server was at capacity
    pub connections_rejected: AtomicU64,
    /// Total bytes sent back to clients
    pub bytes_echoed: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of currently open connections.
    pub fn active(&self) -> usize {
        *self.lock()
    }

    /// Registers a new connection and returns the guard that deregisters it.
    pub fn register(self: &Arc<Self>, peer: SocketAddr) -> ConnectionGuard {
        let now = {
            let mut active = self.lock();
            *active += 1;
            *active
        };
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        info!(client = %peer, active = now, "Client connected");

        ConnectionGuard {
            stats: Arc::clone(self),
            peer,
        }
    }

    pub fn connection_rejected(&self) {
        self.connections_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_echoed(&self, count: usize) {
        self.bytes_echoed.fetch_add(count as u64, Ordering::Relaxed);
    }

    fn deregister(&self, peer: SocketAddr) {
        let now = {
            let mut active = self.lock();
            debug_assert!(*active > 0, "connection deregistered twice");
            *active = active.saturating_sub(1);
            *active
        };
        info!(client = %peer, active = now, "Client disconnected");
    }

    // A panic elsewhere never leaves the count half-updated, so a poisoned
    // lock still holds a valid value.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps one connection registered with [`ConnectionStats`].
#[derive(Debug)]
pub struct ConnectionGuard {
    stats: Arc<ConnectionStats>,
    peer: SocketAddr,
}

impl ConnectionGuard {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.stats.deregister(self.peer);
    }
}
