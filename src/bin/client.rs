//! upcase-echo client harness
//!
//! Opens five concurrent connections to 127.0.0.1:5555, sends one fixed
//! message on each, and prints one line per worker. Exits once every worker
//! has finished.

use anyhow::Context;
use tracing::info;
use upcase_echo::client::{default_work_items, ClientDriver};
use upcase_echo::config::ClientConfig;
use upcase_echo::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = ClientConfig::default();
    let driver = ClientDriver::new(&config, default_work_items())
        .with_context(|| format!("invalid server address '{}'", config.server_address()))?
        .with_reporter(|report| println!("{report}"));

    let outcomes = driver.run().await;
    let completed = outcomes.iter().filter(|outcome| outcome.is_ok()).count();

    info!(completed, "All client workers finished");
    Ok(())
}
