//! Player router: reverse proxy from `/<player id>/...` to per-player backends.

pub mod config;
pub mod http;
pub mod net;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::{Lifecycle, Shutdown};
