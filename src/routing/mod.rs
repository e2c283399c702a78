//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Request URI "/<player id>[/<rest>]"
//!     → resolver.rs (split path, pick id, rebuild remainder)
//!     → BackendTarget "http://<prefix><player id>[/player/<rest>]"
//! ```
//!
//! # Design Decisions
//! - The backend is derived from the URI alone; there is no route table
//! - Targets are computed per request and never cached

pub mod resolver;

pub use resolver::{resolve, BackendTarget};
