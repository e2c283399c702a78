//! One-per-process wiring of OS signals to the shared [`Shutdown`] handle.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::spawn_signal_listener;
use crate::lifecycle::EXIT_CODE;

/// Set by the first successful install; never cleared.
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Errors raised while installing the lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("signal handled context already exists, there can only be one")]
    DuplicateLifecycleInit,
    #[error("failed to install signal handlers: {0}")]
    Signals(#[from] std::io::Error),
}

/// The signal-handled context of the process.
///
/// Must be created inside a Tokio runtime.
#[derive(Debug)]
pub struct Lifecycle {
    shutdown: Shutdown,
}

impl Lifecycle {
    /// Install signal handling, failing if it was installed before.
    pub fn try_install() -> Result<Self, LifecycleError> {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(LifecycleError::DuplicateLifecycleInit);
        }

        let shutdown = Shutdown::new();
        spawn_signal_listener(shutdown.clone())?;
        tracing::debug!("Signal handlers installed");

        Ok(Self { shutdown })
    }

    /// Install signal handling; a second install terminates the process.
    pub fn install() -> Self {
        match Self::try_install() {
            Ok(lifecycle) => lifecycle,
            Err(e) => {
                tracing::error!(error = %e, "Lifecycle initialization failed");
                eprintln!("fatal: {e}");
                std::process::exit(EXIT_CODE);
            }
        }
    }

    /// Handle shared with the server and anything else that may cancel.
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Resolve once the context is cancelled, by signal or internal failure.
    pub async fn done(&self) {
        self.shutdown.cancelled().await;
    }
}
