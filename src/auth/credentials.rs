//! Credential storage
//!
//! In-memory username/password store backing the static authenticator.

use std::collections::HashMap;

/// Credentials loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    /// True when `username` exists and `password` matches.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|stored| stored == password)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for CredentialStore {
    fn from(users: [(&str, &str); N]) -> Self {
        Self::new(
            users
                .into_iter()
                .map(|(user, pass)| (user.to_string(), pass.to_string()))
                .collect(),
        )
    }
}
