//! Client Driver
//!
//! Spawns one task per work item and waits for every one of them before
//! returning. Workers share nothing: each owns its connection, its buffer,
//! and its work item, and may finish in any order.
//!
//! Each worker hands its report to the driver's reporter the moment its
//! exchange completes, so a worker stuck on a silent peer never holds back
//! the output of the others.

use crate::client::worker::{run_worker, ClientError, WorkItem, WorkerReport};
use crate::config::ClientConfig;
use std::fmt;
use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use tracing::{error, info};

/// Called from a worker task with that worker's completed report.
pub type Reporter = Arc<dyn Fn(&WorkerReport) + Send + Sync>;

/// Drives a fixed list of work items against one server.
pub struct ClientDriver {
    addr: SocketAddr,
    response_capacity: usize,
    items: Vec<Arc<WorkItem>>,
    reporter: Reporter,
}

impl ClientDriver {
    /// Creates a driver that reports nothing; see [`ClientDriver::with_reporter`].
    pub fn new(config: &ClientConfig, items: Vec<WorkItem>) -> Result<Self, AddrParseError> {
        Ok(Self {
            addr: config.socket_addr()?,
            response_capacity: config.response_capacity,
            items: items.into_iter().map(Arc::new).collect(),
            reporter: Arc::new(|_: &WorkerReport| {}),
        })
    }

    /// Sets the callback each worker invokes on success, from its own task.
    pub fn with_reporter<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&WorkerReport) + Send + Sync + 'static,
    {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Runs every worker concurrently and joins them all.
    ///
    /// Outcomes come back in work-item order. A failed or panicked worker
    /// shows up as an `Err` entry and never stops the others.
    pub async fn run(&self) -> Vec<Result<WorkerReport, ClientError>> {
        info!(server = %self.addr, workers = self.items.len(), "Starting client workers");

        let handles: Vec<_> = self
            .items
            .iter()
            .map(|item| {
                let item = Arc::clone(item);
                let reporter = Arc::clone(&self.reporter);
                let addr = self.addr;
                let capacity = self.response_capacity;
                tokio::spawn(async move {
                    let outcome = run_worker(addr, &item, capacity).await;
                    match &outcome {
                        Ok(report) => reporter(report),
                        Err(e) => error!(index = item.index(), error = %e, "Client worker failed"),
                    }
                    outcome
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (item, handle) in self.items.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(index = item.index(), error = %e, "Client worker task failed");
                    Err(ClientError::from(e))
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}

impl fmt::Debug for ClientDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientDriver")
            .field("addr", &self.addr)
            .field("response_capacity", &self.response_capacity)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}
