//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!
//! Consumers:
//!     → stdout, collected by the platform's log pipeline
//! ```
//!
//! # Design Decisions
//! - Structured fields (method, uri, player_id, attempt) instead of prose
//! - Request ID set at the edge and forwarded to backends

pub mod logging;

pub use logging::init_logging;
