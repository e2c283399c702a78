//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router (`/alive` plus the proxy catch-all)
//! - Wire up middleware (request ID, tracing)
//! - Serve HTTP/1.1 with keep-alive off and bounded header/body/write time
//! - Size the connection deadline so the forwarder always gets to answer
//! - Run the accept loop, drain on shutdown, cancel on listener failure

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{request::Parts, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::accept::Accept;
use axum_server::tls_rustls::RustlsAcceptor;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, TimeoutConfig};
use crate::http::error::ProxyError;
use crate::http::forward::{Forwarder, ForwarderSetupError};
use crate::http::request::{read_body, OutboundRequest};
use crate::http::response::relay;
use crate::lifecycle::{Shutdown, ShutdownFlag};
use crate::net::{load_tls_config, ConnectionTracker, Listener, ListenerError, TlsError};
use crate::routing::resolve;

/// Errors that end the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("listener failure: {0}")]
    ListenerFailure(#[from] ListenerError),
    #[error("TLS setup failed: {0}")]
    Tls(#[from] TlsError),
    #[error("forwarder setup failed: {0}")]
    Forwarder(#[from] ForwarderSetupError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub service_prefix: Arc<str>,
    pub max_body_bytes: usize,
    pub read_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, ServerError> {
        Ok(Self {
            forwarder: Arc::new(Forwarder::from_config(config)?),
            service_prefix: Arc::from(config.backends.service_prefix.as_str()),
            max_body_bytes: config.limits.max_body_bytes,
            read_timeout: Duration::from_secs(config.timeouts.read_secs),
        })
    }
}

/// Per-connection protocol limits.
#[derive(Debug, Clone, Copy)]
struct ConnectionLimits {
    header_read_timeout: Duration,
    /// Whole-connection deadline; one request per connection.
    deadline: Duration,
}

impl ConnectionLimits {
    /// Header, body and write phases plus everything `forward_budget` allows
    /// the forwarder.
    fn new(timeouts: &TimeoutConfig, forward_budget: Duration) -> Self {
        let client_phases =
            Duration::from_secs(timeouts.header_read_secs + timeouts.read_secs + timeouts.write_secs);
        Self {
            header_read_timeout: Duration::from_secs(timeouts.header_read_secs),
            deadline: client_phases + forward_budget,
        }
    }
}

/// HTTP server for the player router.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    tls: Option<RustlsAcceptor>,
    limits: ConnectionLimits,
    shutdown_flag: Arc<ShutdownFlag>,
    connections: ConnectionTracker,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let state = AppState::from_config(&config)?;
        let tls = match &config.listener.tls {
            Some(tls) => Some(RustlsAcceptor::new(load_tls_config(tls)?)),
            None => None,
        };

        let limits = ConnectionLimits::new(&config.timeouts, state.forwarder.budget());

        Ok(Self {
            router: build_router(state),
            limits,
            config,
            tls,
            shutdown_flag: Arc::new(ShutdownFlag::new()),
            connections: ConnectionTracker::new(),
        })
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The flag marking an intentional listener close.
    pub fn shutdown_flag(&self) -> Arc<ShutdownFlag> {
        Arc::clone(&self.shutdown_flag)
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn serve(self, shutdown: Shutdown) -> Result<(), ServerError> {
        let listener = Listener::bind(&self.config.listener.bind_address).await?;
        self.run(listener, shutdown).await
    }

    /// Serve on `listener` until `shutdown` triggers, then drain.
    pub async fn run(self, listener: Listener, shutdown: Shutdown) -> Result<(), ServerError> {
        tracing::info!(
            address = %listener.local_addr().map_err(ListenerError::Accept)?,
            tls = self.tls.is_some(),
            "HTTP server starting"
        );

        let result = loop {
            tokio::select! {
                _ = shutdown.cancelled() => break Ok(()),
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote)) => self.spawn_connection(stream, remote),
                    Err(e) => break Err(ServerError::from(e)),
                },
            }
        };

        if shutdown.is_triggered() {
            self.shutdown_flag.set();
        }
        drop(listener);
        self.drain().await;
        result
    }

    /// Run the server in its own task.
    ///
    /// An unexpected exit cancels `shutdown` so the rest of the process can
    /// clean up; an exit during requested shutdown is expected and ignored.
    pub fn spawn(self, shutdown: Shutdown) -> JoinHandle<()> {
        let flag = self.shutdown_flag();
        tokio::spawn(async move {
            match self.serve(shutdown.clone()).await {
                Ok(()) => tracing::info!("HTTP server stopped"),
                Err(e) if flag.is_set() => {
                    tracing::debug!(error = %e, "Listener closed during shutdown");
                }
                Err(e) => {
                    tracing::error!(error = %e, "HTTP server has failed");
                    shutdown.trigger();
                }
            }
        })
    }

    fn spawn_connection(&self, stream: TcpStream, remote: SocketAddr) {
        let guard = self.connections.track();
        let router = self.router.clone();
        let tls = self.tls.clone();
        let limits = self.limits;

        tokio::spawn(async move {
            let connection_id = guard.id();
            match tls {
                Some(acceptor) => match acceptor.accept(stream, ()).await {
                    Ok((stream, ())) => serve_connection(stream, remote, router, limits).await,
                    Err(e) => tracing::debug!(
                        connection_id = %connection_id,
                        remote_addr = %remote,
                        error = %e,
                        "TLS handshake failed"
                    ),
                },
                None => serve_connection(stream, remote, router, limits).await,
            }
            drop(guard);
        });
    }

    async fn drain(&self) {
        let active = self.connections.active_count();
        if active == 0 {
            return;
        }

        let grace = Duration::from_secs(self.config.timeouts.drain_secs);
        tracing::info!(active, grace_secs = grace.as_secs(), "Draining connections");
        if tokio::time::timeout(grace, self.connections.wait_idle()).await.is_err() {
            tracing::warn!(
                remaining = self.connections.active_count(),
                "Drain deadline passed, abandoning connections"
            );
        }
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/alive", any(alive))
        .fallback(proxy_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Serve exactly one request on `io`.
async fn serve_connection<I>(io: I, remote: SocketAddr, router: Router, limits: ConnectionLimits)
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let service = hyper::service::service_fn(move |mut request: Request<Incoming>| {
        request.extensions_mut().insert(ConnectInfo(remote));
        router.clone().oneshot(request)
    });

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(false)
        .timer(TokioTimer::new())
        .header_read_timeout(limits.header_read_timeout);

    let connection = builder.serve_connection(TokioIo::new(io), service);
    match tokio::time::timeout(limits.deadline, connection).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!(remote_addr = %remote, error = %e, "Connection error"),
        Err(_) => tracing::warn!(remote_addr = %remote, "Connection deadline exceeded"),
    }
}

/// Liveness probe.
async fn alive(
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
) -> StatusCode {
    tracing::info!(method = %method, uri = %uri, remote_addr = %remote, "Received liveness probe");
    StatusCode::OK
}

/// Main proxy handler: resolve, forward, relay.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let (parts, body) = request.into_parts();
    tracing::info!(
        method = %parts.method,
        uri = %parts.uri,
        remote_addr = %remote,
        "Received request"
    );

    match proxy(&state, parts, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Proxy request failed");
            e.into_response()
        }
    }
}

async fn proxy(state: &AppState, parts: Parts, body: Body) -> Result<Response, ProxyError> {
    let target = resolve(&parts.uri, &state.service_prefix)?;
    tracing::info!(player_id = target.player_id(), backend = %target, "Proxying request");

    let body = read_body(body, state.max_body_bytes, state.read_timeout)
        .await
        .map_err(|reason| ProxyError::RequestConstruction {
            target: target.url().to_string(),
            reason,
        })?;
    let outbound = OutboundRequest::new(parts.method, &target, parts.headers, body)?;

    let response = state.forwarder.forward(&outbound).await?;
    tracing::debug!(status = %response.status(), backend = %target, "Backend responded");
    relay(response).await
}
