//! Authentication validator
//!
//! Defines the [`Authenticator`] capability checked on every protected request
//! and the credential-store implementation of it.

use log::{debug, warn};
use std::sync::Arc;

use super::credentials::CredentialStore;
use crate::config::{AuthBackend, AuthConfig};
use crate::error::AuthError;

/// Verifies a username/password pair.
///
/// Implementations may block; callers run them off the async executor.
pub trait Authenticator: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Performs basic input sanitation to check for malicious or malformed usernames/passwords.
pub fn is_valid_input(input: &str, max_length: usize) -> bool {
    !input.trim().is_empty() && input.len() <= max_length && !input.contains(['\r', '\n', '\0'])
}

/// Authenticates against the configured credential store.
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    store: CredentialStore,
    max_length: usize,
}

impl StaticAuthenticator {
    pub fn new(store: CredentialStore, max_length: usize) -> Self {
        Self { store, max_length }
    }
}

impl Authenticator for StaticAuthenticator {
    fn verify(&self, username: &str, password: &str) -> bool {
        if !is_valid_input(username, self.max_length) || !is_valid_input(password, self.max_length)
        {
            debug!("Rejected malformed credentials");
            return false;
        }
        if !self.store.contains(username) {
            debug!("Unknown user: {}", username);
            return false;
        }
        self.store.matches(username, password)
    }
}

/// Builds the authenticator selected in configuration.
pub fn from_config(config: &AuthConfig) -> Result<Arc<dyn Authenticator>, AuthError> {
    match config.backend {
        AuthBackend::Static => {
            if config.users.is_empty() {
                warn!("Static authentication has no users configured; every request will be rejected");
            }
            let store = CredentialStore::new(config.users.clone());
            Ok(Arc::new(StaticAuthenticator::new(
                store,
                config.max_credential_length,
            )))
        }
        #[cfg(feature = "pam")]
        AuthBackend::Pam => Ok(Arc::new(super::pam::PamAuthenticator::new(
            &config.pam_service,
            config.max_credential_length,
        ))),
        #[cfg(not(feature = "pam"))]
        AuthBackend::Pam => Err(AuthError::Backend(
            "PAM support was not compiled in".into(),
        )),
    }
}
