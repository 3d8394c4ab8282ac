//! Host account authentication through PAM.

use log::{debug, warn};

use super::validator::{Authenticator, is_valid_input};

/// Checks credentials against the host's PAM stack.
#[derive(Debug, Clone)]
pub struct PamAuthenticator {
    service: String,
    max_length: usize,
}

impl PamAuthenticator {
    pub fn new(service: &str, max_length: usize) -> Self {
        Self {
            service: service.to_string(),
            max_length,
        }
    }
}

impl Authenticator for PamAuthenticator {
    fn verify(&self, username: &str, password: &str) -> bool {
        if !is_valid_input(username, self.max_length) || !is_valid_input(password, self.max_length)
        {
            return false;
        }

        let mut client = match ::pam::Client::with_password(&self.service) {
            Ok(client) => client,
            Err(e) => {
                warn!("Failed to start PAM session for service {}: {:?}", self.service, e);
                return false;
            }
        };
        client.conversation_mut().set_credentials(username, password);

        match client.authenticate() {
            Ok(()) => true,
            Err(e) => {
                debug!("PAM rejected {}: {:?}", username, e);
                false
            }
        }
    }
}
