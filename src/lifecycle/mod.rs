//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Install lifecycle → Bind listener → Serve
//!
//! Signals (signals.rs, coordinator.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger()
//!     second SIGTERM/SIGINT → exit immediately
//!
//! Shutdown (shutdown.rs):
//!     trigger → server sets ShutdownFlag → stop accepting → drain → exit 1
//! ```
//!
//! # Design Decisions
//! - Exactly one signal-to-cancellation wiring per process
//! - Listener failure cancels the context instead of exiting directly
//! - Drain has a deadline; the process always exits with status 1

pub mod coordinator;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use coordinator::{Lifecycle, LifecycleError};
pub use shutdown::{Shutdown, ShutdownFlag};

/// Status the process exits with once the context is done.
pub const EXIT_CODE: i32 = 1;
