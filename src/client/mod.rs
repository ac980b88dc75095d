//! Client Harness
//!
//! Opens several concurrent connections, sends one fixed message on each,
//! and collects the echoed responses.
//!
//! ## Example
//!
//! ```ignore
//! use upcase_echo::client::{default_work_items, ClientDriver};
//! use upcase_echo::config::ClientConfig;
//!
//! let driver = ClientDriver::new(&ClientConfig::default(), default_work_items())?
//!     .with_reporter(|report| println!("{report}"));
//! let outcomes = driver.run().await;
//! ```

pub mod driver;
pub mod worker;

pub use driver::{ClientDriver, Reporter};
pub use worker::{
    default_work_items, expected_response_len, run_worker, ClientError, WorkItem, WorkerReport,
};
