//! Per-request failure taxonomy.
//!
//! Every variant is answered with a 500 and a short fixed message; the
//! detailed cause only goes to the log so internal addresses never reach
//! the client.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Transport-level failure of a single forwarding attempt.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("invalid redirect: {0}")]
    Redirect(String),
    #[error("stopped after {0} redirects")]
    TooManyRedirects(usize),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Errors raised while serving a proxied request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("path '{path}' does not contain a player id")]
    MalformedPath { path: String },

    #[error("cannot build request for '{target}': {reason}")]
    RequestConstruction { target: String, reason: String },

    #[error("all {attempts} attempts failed: {source}")]
    BackendUnreachable {
        attempts: u32,
        #[source]
        source: ForwardError,
    },

    #[error("relaying backend body failed: {0}")]
    RelayWrite(#[source] axum::BoxError),
}

impl ProxyError {
    /// The message shown to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::MalformedPath { .. } => "failed parsing player id from uri",
            ProxyError::RequestConstruction { .. } => "failed to create request",
            ProxyError::BackendUnreachable { .. } => "failed to reach service",
            ProxyError::RelayWrite(_) => "failed to write response back to originating client",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.public_message()).into_response()
    }
}
