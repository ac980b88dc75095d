//! upcase-echo server
//!
//! Binds 127.0.0.1:5555 and echoes every chunk it receives back to the
//! sender, uppercased. Runs until Ctrl+C, or until the listening socket
//! fails, in which case the process exits with a failure status.

use tokio::signal;
use tracing::{error, info};
use upcase_echo::config::ServerConfig;
use upcase_echo::server::EchoServer;
use upcase_echo::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = ServerConfig::default();
    info!(version = upcase_echo::VERSION, address = %config.bind_address(), "Starting upcase-echo");

    let server = match EchoServer::bind(config) {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "Failed to set up listening socket");
            std::process::exit(1);
        }
    };

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, stopping server...");
    };

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!(error = %e, "Listener failed");
                std::process::exit(1);
            }
        }
        _ = shutdown => {}
    }

    info!("Server shutdown complete");
    Ok(())
}
