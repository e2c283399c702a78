//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (hyper http1, keep-alive off, Axum router)
//!     → "/alive" → 200
//!     → otherwise:
//!         routing::resolve (player id → backend target)
//!         → request.rs (buffer body, prepare headers)
//!         → forward.rs (retrying client, redirect rewrite)
//!         → response.rs (relay status, headers, streamed body)
//!     → Send to client
//! ```

pub mod error;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use error::{ForwardError, ProxyError};
pub use forward::{Forwarder, ForwarderSetupError, RedirectRewrite};
pub use request::OutboundRequest;
pub use server::{build_router, AppState, HttpServer, ServerError};
