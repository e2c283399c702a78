//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGINT and SIGTERM handlers
//! - First signal: trigger graceful shutdown
//! - Second signal: exit immediately (escape hatch for a stuck shutdown)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered before returning, so no signal is missed
//!   between install and the listener task starting

use std::io;

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::EXIT_CODE;

/// Install signal handlers and spawn the task reacting to them.
#[cfg(unix)]
pub fn spawn_signal_listener(shutdown: Shutdown) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, Signal, SignalKind};

    async fn next_signal(interrupt: &mut Signal, terminate: &mut Signal) -> &'static str {
        tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
        }
    }

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        let sig = next_signal(&mut interrupt, &mut terminate).await;
        tracing::info!(signal = sig, "Received signal, cancelling context");
        shutdown.trigger();

        let sig = next_signal(&mut interrupt, &mut terminate).await;
        tracing::warn!(signal = sig, "Received second signal, exiting program");
        std::process::exit(EXIT_CODE);
    }))
}

/// Install the Ctrl-C handler and spawn the task reacting to it.
#[cfg(not(unix))]
pub fn spawn_signal_listener(shutdown: Shutdown) -> io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to listen for Ctrl-C");
            return;
        }
        tracing::info!(signal = "ctrl-c", "Received signal, cancelling context");
        shutdown.trigger();

        let _ = tokio::signal::ctrl_c().await;
        tracing::warn!(signal = "ctrl-c", "Received second signal, exiting program");
        std::process::exit(EXIT_CODE);
    }))
}
