//! Error handlers
//!
//! Converts domain errors into HTTP responses. This is the only place where
//! error kinds are mapped to status codes.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::types::{AuthError, FsError};

/// JSON envelope used for error responses and for bodiless successes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub code: u16,
    pub reason: String,
    pub message: String,
}

impl StatusBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            message: message.into(),
        }
    }
}

/// Builds a `(status, envelope)` response.
pub fn status_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(StatusBody::new(status, message))).into_response()
}

/// Any failure a request handler can produce.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("unsupported media type requested: {0}")]
    NotAcceptable(String),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Fs(err) => error_to_status(err),
            ApiError::Auth(AuthError::Backend(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotAcceptable(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message placed in the response envelope. Credential details are not
    /// echoed back to the client.
    fn public_message(&self) -> String {
        match self {
            ApiError::Auth(AuthError::InvalidCredentials(_)) => "invalid credentials".to_string(),
            other => other.to_string(),
        }
    }
}

/// Convert a filesystem error to its HTTP status code
pub fn error_to_status(err: &FsError) -> StatusCode {
    match err {
        FsError::NotFound(_) => StatusCode::NOT_FOUND,
        FsError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        FsError::InvalidPath(_)
        | FsError::AlreadyExists(_)
        | FsError::NotADirectory(_)
        | FsError::IsADirectory(_)
        | FsError::UnsupportedType(_)
        | FsError::Generic(_) => StatusCode::BAD_REQUEST,
        FsError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        FsError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        let mut response = status_response(status, self.public_message());
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Basic realm="filesystem""#),
            );
        }
        response
    }
}
