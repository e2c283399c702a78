//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → connect timeout (http client)
//!     → On transport failure: retries.rs (fixed delay, bounded attempts)
//!     → Exhausted: caller maps to BackendUnreachable
//! ```
//!
//! # Design Decisions
//! - Backends restart and redeploy; a small fixed budget rides that out
//! - Received responses are never retried, whatever their status

pub mod retries;

pub use retries::{RetryExhausted, RetryPolicy};
