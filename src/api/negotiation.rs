//! Content negotiation for `GET /filesystem/{path}`.

use axum::http::{HeaderMap, header};

use crate::error::ApiError;

/// What the client asked to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Directory listing as a JSON array.
    Listing,
    /// Raw file bytes or a directory archive.
    Attachment,
}

/// Picks a representation from the `Accept` header.
///
/// The first recognised media type wins; quality values are ignored. A
/// missing header or a wildcard means JSON.
pub fn negotiate(headers: &HeaderMap) -> Result<Representation, ApiError> {
    let Some(value) = headers.get(header::ACCEPT) else {
        return Ok(Representation::Listing);
    };
    let accept = value
        .to_str()
        .map_err(|_| ApiError::NotAcceptable("non-ASCII Accept header".into()))?;
    if accept.trim().is_empty() {
        return Ok(Representation::Listing);
    }

    for media in accept.split(',') {
        let media = media.split(';').next().unwrap_or_default().trim();
        if media.eq_ignore_ascii_case("application/json")
            || media == "*/*"
            || media.eq_ignore_ascii_case("application/*")
        {
            return Ok(Representation::Listing);
        }
        if media.eq_ignore_ascii_case("application/octet-stream") {
            return Ok(Representation::Attachment);
        }
    }
    Err(ApiError::NotAcceptable(accept.to_string()))
}
