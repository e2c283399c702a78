//! Response relay from backend to client.
//!
//! # Responsibilities
//! - Pass status and every header value (order kept) through untouched
//! - Stream the body instead of buffering it
//! - Report body failures to the client while that is still possible
//!
//! # Design Decisions
//! - The first body frame is read before the status line is committed, so a
//!   backend that dies right after its headers still yields a clean 500
//! - Failures after commit can only be logged; hyper aborts the connection
//! - The backend body is owned by the relayed body and closed when dropped

use std::fmt::Display;

use axum::body::{Body, Bytes};
use axum::http::Response;
use axum::BoxError;
use futures_util::{stream, StreamExt, TryStreamExt};
use http_body_util::{BodyExt, BodyStream, StreamBody};
use hyper::body::Body as HttpBody;

use crate::http::error::ProxyError;

/// Turn a backend response into the response sent to the client.
pub async fn relay<B>(response: Response<B>) -> Result<Response<Body>, ProxyError>
where
    B: HttpBody<Data = Bytes> + Send + Unpin + 'static,
    B::Error: Into<BoxError> + Display + Send + Sync + 'static,
{
    let (parts, mut body) = response.into_parts();

    let first = match body.frame().await {
        None => None,
        Some(Ok(frame)) => Some(frame),
        Some(Err(e)) => return Err(ProxyError::RelayWrite(e.into())),
    };

    let status = parts.status;
    let rest = TryStreamExt::inspect_err(BodyStream::new(body), move |e| {
        tracing::error!(
            status = %status,
            error = %e,
            "backend body failed after response was committed"
        );
    });
    let frames = stream::iter(first.map(Ok)).chain(rest);

    Ok(Response::from_parts(parts, Body::new(StreamBody::new(frames))))
}
