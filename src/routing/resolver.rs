//! Backend resolution from the request path.
//!
//! # Responsibilities
//! - Extract the player id (segment 1 of the path)
//! - Rebuild the remaining segments under `/player/`
//! - Carry the original query string over unchanged
//!
//! # Design Decisions
//! - Pure string transformation, no I/O and no caching
//! - The id is passed through verbatim; an id that is not a valid host
//!   fails later when the outbound request is built or connected

use axum::http::Uri;

use crate::http::error::ProxyError;

/// Path prefix backends serve player routes under.
pub const PLAYER_PATH: &str = "/player/";

/// The backend a request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    player_id: String,
    authority: String,
    url: String,
}

impl BackendTarget {
    /// The entity identifier taken from the path.
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// `<service_prefix><player id>`, the only authority the request may reach.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Absolute target URL, e.g. `http://splunk-arcade-cabinet-player-42/player/score`.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Display for BackendTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Resolve the backend for `uri`, addressing it as `<service_prefix><player id>`.
pub fn resolve(uri: &Uri, service_prefix: &str) -> Result<BackendTarget, ProxyError> {
    let path = uri.path();
    let segments: Vec<&str> = path.split('/').collect();

    let player_id = match segments.get(1) {
        Some(id) if !id.is_empty() => *id,
        _ => {
            return Err(ProxyError::MalformedPath {
                path: path.to_string(),
            })
        }
    };

    let remainder = segments[2..].join("/");

    let authority = format!("{service_prefix}{player_id}");
    let mut url = format!("http://{authority}");
    if !remainder.is_empty() {
        url.push_str(PLAYER_PATH);
        url.push_str(&remainder);
    }
    if let Some(query) = uri.query() {
        url.push('?');
        url.push_str(query);
    }

    Ok(BackendTarget {
        player_id: player_id.to_string(),
        authority,
        url,
    })
}
