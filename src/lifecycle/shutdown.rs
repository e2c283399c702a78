//! Shutdown coordination for the router.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;

/// Process-wide cancellation handle.
///
/// Cloning is cheap; every clone observes the same trigger. A trigger that
/// happened before someone started waiting is still seen.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Create a new, untriggered handle.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger the shutdown signal. Later calls are no-ops.
    pub fn trigger(&self) {
        self.tx.send_if_modified(|triggered| !std::mem::replace(triggered, true));
    }

    /// Whether shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until shutdown is triggered.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks that the listener is being closed on purpose.
///
/// Written once when shutdown starts, read by the listener's failure path
/// to tell an intentional close from a crash.
#[derive(Debug, Default)]
pub struct ShutdownFlag {
    shutting_down: RwLock<bool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Returns `true` only for the call that set it.
    pub fn set(&self) -> bool {
        let mut guard = self
            .shutting_down
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        !std::mem::replace(&mut *guard, true)
    }

    pub fn is_set(&self) -> bool {
        *self
            .shutting_down
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
