//! TCP listener implementation.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Ride out per-connection accept errors, surface the rest
//!
//! # Design Decisions
//! - No connection cap: concurrency is bounded by connection handling only
//! - Descriptor exhaustion is treated as transient and retried after a pause

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};

/// Pause after running out of file descriptors.
const EXHAUSTED_BACKOFF: Duration = Duration::from_millis(100);

/// Error type for listener operations.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
    /// Failed to accept connection.
    #[error("Failed to accept: {0}")]
    Accept(#[source] io::Error),
}

/// A bound TCP listener.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to `address` (e.g. "0.0.0.0:5000").
    pub async fn bind(address: &str) -> Result<Self, ListenerError> {
        let bind_error = |source| ListenerError::Bind {
            address: address.to_string(),
            source,
        };

        let addr: SocketAddr = address
            .parse()
            .map_err(|e| bind_error(io::Error::new(io::ErrorKind::InvalidInput, e)))?;
        let inner = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = inner.local_addr().map_err(bind_error)?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner })
    }

    /// Accept the next connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        loop {
            match self.inner.accept().await {
                Ok((stream, addr)) => {
                    tracing::debug!(peer_addr = %addr, "Connection accepted");
                    return Ok((stream, addr));
                }
                Err(e) if is_connection_error(&e) => {
                    tracing::debug!(error = %e, "Connection failed during accept");
                }
                Err(e) if is_resource_exhausted(&e) => {
                    tracing::warn!(error = %e, "Out of descriptors, pausing accept");
                    tokio::time::sleep(EXHAUSTED_BACKOFF).await;
                }
                Err(e) => return Err(ListenerError::Accept(e)),
            }
        }
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

/// Errors that concern only the connection being accepted.
fn is_connection_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

/// EMFILE / ENFILE.
fn is_resource_exhausted(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(23) | Some(24))
}
