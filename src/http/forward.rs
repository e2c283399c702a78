//! Forwarding to player backends.
//!
//! # Responsibilities
//! - Own the outbound HTTP client (no idle pooling, connect timeout)
//! - Follow redirects, keeping redirects to the public host inside the cluster
//! - Retry transport failures through the fixed retry policy
//!
//! # Design Decisions
//! - A backend that answers at all is a success, 5xx included
//! - Redirect following is part of one attempt; a failed hop fails the attempt
//! - Each attempt is bounded, so a silent backend still ends in a 500
//! - `https` redirect targets are followed with webpki roots

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, Method, Response, StatusCode};
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use rustls::crypto::aws_lc_rs::default_provider;
use url::Url;

use crate::config::{ProxyConfig, RedirectConfig, TimeoutConfig};
use crate::http::error::{ForwardError, ProxyError};
use crate::http::request::{build_request, strip_body_headers, to_uri, url_authority, OutboundRequest};
use crate::resilience::RetryPolicy;

/// Client type used for every backend call.
pub type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Errors building a [`Forwarder`] from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ForwarderSetupError {
    #[error("invalid portal host: {0}")]
    PortalHost(#[from] url::ParseError),
    #[error("backend TLS setup failed: {0}")]
    Tls(#[from] rustls::Error),
}

/// Build the backend client.
///
/// Idle connections are not kept: a backend that restarted must never be
/// reached through a connection opened to its previous incarnation.
pub fn build_client(timeouts: &TimeoutConfig) -> Result<HttpClient, rustls::Error> {
    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

    let connector = HttpsConnectorBuilder::new()
        .with_provider_and_webpki_roots(default_provider())?
        .https_or_http()
        .enable_http1()
        .wrap_connector(http);

    Ok(Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(0)
        .build(connector))
}

/// Rewrites redirects aimed at the public host to the internal portal.
#[derive(Debug, Clone)]
pub struct RedirectRewrite {
    public_host: String,
    portal: Url,
    max_hops: usize,
}

impl RedirectRewrite {
    pub fn new(config: &RedirectConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            public_host: config.public_host.to_ascii_lowercase(),
            portal: Url::parse(&format!("http://{}", config.portal_host))?,
            max_hops: config.max_hops,
        })
    }

    /// Apply the rewrite rule to a redirect target.
    pub fn apply(&self, mut url: Url) -> Result<Url, ForwardError> {
        if url_authority(&url) != self.public_host {
            return Ok(url);
        }

        // The portal is a plain-HTTP in-cluster service.
        let original = url.to_string();
        if url.set_scheme("http").is_err() || url.set_port(self.portal.port()).is_err() {
            return Err(ForwardError::Redirect(format!("cannot rewrite '{original}'")));
        }
        url.set_host(self.portal.host_str())
            .map_err(|e| ForwardError::Redirect(e.to_string()))?;
        Ok(url)
    }
}

/// Sends outbound requests with retries and redirect handling.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: HttpClient,
    retry: RetryPolicy,
    redirects: RedirectRewrite,
    attempt_timeout: Duration,
}

impl Forwarder {
    pub fn new(
        client: HttpClient,
        retry: RetryPolicy,
        redirects: RedirectRewrite,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            client,
            retry,
            redirects,
            attempt_timeout,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Result<Self, ForwarderSetupError> {
        Ok(Self::new(
            build_client(&config.timeouts)?,
            RetryPolicy::from_config(&config.retries),
            RedirectRewrite::new(&config.redirects)?,
            Duration::from_secs(config.timeouts.attempt_secs),
        ))
    }

    /// Longest time [`forward`](Self::forward) takes to give up.
    pub fn budget(&self) -> Duration {
        let attempts = self.retry.max_attempts();
        self.attempt_timeout * attempts + self.retry.delay() * (attempts - 1)
    }

    /// Deliver `request`, retrying transport failures.
    pub async fn forward(&self, request: &OutboundRequest) -> Result<Response<Incoming>, ProxyError> {
        let limit = self.attempt_timeout;
        self.retry
            .run(move |attempt| async move {
                tracing::debug!(attempt, uri = %request.uri, "forwarding request");
                tokio::time::timeout(limit, self.send(request))
                    .await
                    .unwrap_or_else(|_| Err(ForwardError::Timeout(limit)))
            })
            .await
            .map_err(|exhausted| ProxyError::BackendUnreachable {
                attempts: exhausted.attempts,
                source: exhausted.last_error,
            })
    }

    /// One attempt: send and follow redirects.
    async fn send(&self, request: &OutboundRequest) -> Result<Response<Incoming>, ForwardError> {
        let mut method = request.method.clone();
        let mut uri = request.uri.clone();
        let mut url = request.url.clone();
        let mut headers = request.headers.clone();
        let mut body = request.body.clone();
        let mut hops = 0;

        loop {
            let response = self
                .client
                .request(build_request(&method, uri, &headers, body.clone()))
                .await?;

            let Some(location) = redirect_location(&response) else {
                return Ok(response);
            };
            if hops >= self.redirects.max_hops {
                return Err(ForwardError::TooManyRedirects(hops));
            }
            hops += 1;

            let next = url
                .join(&location)
                .map_err(|e| ForwardError::Redirect(format!("bad location '{location}': {e}")))?;
            let next = self.redirects.apply(next)?;

            let status = response.status();
            if matches!(
                status,
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
            ) {
                if method != Method::HEAD {
                    method = Method::GET;
                }
                body = Bytes::new();
                strip_body_headers(&mut headers);
            }

            tracing::debug!(from = %url, to = %next, status = %status, "following redirect");
            uri = to_uri(&next).map_err(ForwardError::Redirect)?;
            url = next;
        }
    }
}

/// The `Location` of a redirect response, if it is one we follow.
fn redirect_location<B>(response: &Response<B>) -> Option<String> {
    let is_redirect = matches!(
        response.status(),
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    );
    if !is_redirect {
        return None;
    }
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
