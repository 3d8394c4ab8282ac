//! Authentication middleware
//!
//! Gates protected routes behind HTTP Basic credentials. The verified
//! username is attached to the request as [`CurrentUser`].

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Basic};
use log::{debug, warn};
use std::sync::Arc;

use crate::api::AppState;
use crate::error::{ApiError, AuthError};

/// Username of the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// Rejects requests without valid Basic credentials with 401.
pub async fn require_auth(
    State(state): State<AppState>,
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        debug!("Missing credentials for {}", req.uri().path());
        return Err(AuthError::MissingCredentials.into());
    };

    let username = auth_header.username().to_string();
    let password = auth_header.password().to_string();
    let authenticator = Arc::clone(&state.authenticator);

    let verified = {
        let username = username.clone();
        tokio::task::spawn_blocking(move || authenticator.verify(&username, &password))
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?
    };

    if !verified {
        warn!("Authentication failed for user {}", username);
        return Err(AuthError::InvalidCredentials(username).into());
    }

    req.extensions_mut().insert(CurrentUser(username));
    Ok(next.run(req).await)
}
