//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the server from a validated config
//! - Start the listener task
//! - Block until the shared context is cancelled, then let the server drain
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener starts last (traffic only when ready)
//! - Whatever ended the context, the process exits with the same status

use std::process::ExitCode;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::{Lifecycle, EXIT_CODE};

/// Run the router until the lifecycle's context is done.
pub async fn run(config: ProxyConfig, lifecycle: Lifecycle) -> ExitCode {
    let server = match HttpServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize server");
            return exit_code();
        }
    };

    tracing::info!("Starting to serve...");
    let server_task = server.spawn(lifecycle.shutdown());

    lifecycle.done().await;
    tracing::info!("Context is done, exiting...");

    // The server task stops accepting and drains within its own deadline.
    if let Err(e) = server_task.await {
        tracing::error!(error = %e, "Server task panicked");
    }

    exit_code()
}

fn exit_code() -> ExitCode {
    ExitCode::from(EXIT_CODE as u8)
}
