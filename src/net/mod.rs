//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop)
//!     → tls.rs (optional TLS handshake, hardened suites)
//!     → connection.rs (lifecycle tracking for drain)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - One request per connection; keep-alive is off
//! - Each connection tracked for graceful shutdown
//! - TLS is optional and handled transparently

pub mod connection;
pub mod listener;
pub mod tls;

pub use connection::{ConnectionGuard, ConnectionId, ConnectionTracker};
pub use listener::{Listener, ListenerError};
pub use tls::{load_tls_config, TlsError};
