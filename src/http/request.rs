//! Request handling and transformation.
//!
//! # Responsibilities
//! - Buffer the client body once, bounded in size and time
//! - Strip headers that belong to the client connection (Host, framing)
//! - Build a fresh outbound request for every attempt and redirect hop
//!
//! # Design Decisions
//! - Buffered bodies are `Bytes`, so each attempt clones a refcount
//! - Target validity is checked once, before the first attempt
//! - The resolved target is sent as-is: dot segments and escapes are not
//!   normalised, and the authority must be exactly `<prefix><id>`

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, Uri};
use url::Url;

use crate::http::error::ProxyError;
use crate::routing::BackendTarget;

/// Headers never copied to the backend.
const CONNECTION_HEADERS: [header::HeaderName; 2] = [header::HOST, header::TRANSFER_ENCODING];

/// Headers dropped when a redirect turns the request into a body-less GET.
const BODY_HEADERS: [header::HeaderName; 3] = [
    header::CONTENT_LENGTH,
    header::CONTENT_TYPE,
    header::CONTENT_ENCODING,
];

/// Read the whole client body, failing past `limit` bytes or `timeout`.
pub async fn read_body(body: Body, limit: usize, timeout: Duration) -> Result<Bytes, String> {
    match tokio::time::timeout(timeout, axum::body::to_bytes(body, limit)).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(format!("reading request body: {e}")),
        Err(_) => Err(format!("request body not received within {timeout:?}")),
    }
}

/// Copy of the client headers suitable for the backend.
pub fn forwardable_headers(mut headers: HeaderMap) -> HeaderMap {
    for name in CONNECTION_HEADERS {
        headers.remove(name);
    }
    headers
}

/// Remove body-describing headers from `headers`.
pub fn strip_body_headers(headers: &mut HeaderMap) {
    for name in BODY_HEADERS {
        headers.remove(name);
    }
}

/// The request sent to a backend, reusable across attempts.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    /// Request target exactly as resolved.
    pub uri: Uri,
    /// Parsed target, the base relative redirects resolve against.
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OutboundRequest {
    /// Prepare a request for `target`, rejecting targets that are not valid URLs.
    pub fn new(
        method: Method,
        target: &BackendTarget,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Self, ProxyError> {
        let construction = |reason: String| ProxyError::RequestConstruction {
            target: target.url().to_string(),
            reason,
        };

        let url = Url::parse(target.url()).map_err(|e| construction(e.to_string()))?;
        if !url.username().is_empty()
            || url.password().is_some()
            || !same_authority(&url, target.authority())
        {
            return Err(construction(format!(
                "resolves to '{}' instead of '{}'",
                url_authority(&url),
                target.authority()
            )));
        }
        let uri = target
            .url()
            .parse::<Uri>()
            .map_err(|e| construction(format!("not a valid request uri: {e}")))?;

        Ok(Self {
            method,
            uri,
            url,
            headers: forwardable_headers(headers),
            body,
        })
    }
}

/// `host[:port]` as it appears in the URL.
pub fn url_authority(url: &Url) -> String {
    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}

/// Whether `url` addresses exactly `expected`. An explicit default port in
/// `expected` matches the parser having dropped it.
fn same_authority(url: &Url, expected: &str) -> bool {
    let expected = expected.to_ascii_lowercase();
    let actual = url_authority(url);
    if actual == expected {
        return true;
    }
    url.port().is_none()
        && url
            .port_or_known_default()
            .is_some_and(|port| expected == format!("{actual}:{port}"))
}

/// Convert a parsed URL to the URI form hyper expects.
pub fn to_uri(url: &Url) -> Result<Uri, String> {
    url.as_str()
        .parse::<Uri>()
        .map_err(|e| format!("'{url}' is not a valid request uri: {e}"))
}

/// Assemble one hyper request.
pub fn build_request(method: &Method, uri: Uri, headers: &HeaderMap, body: Bytes) -> Request<Body> {
    let mut request = Request::new(Body::from(body));
    *request.method_mut() = method.clone();
    *request.uri_mut() = uri;
    *request.headers_mut() = headers.clone();
    request
}
