//! Authentication system
//!
//! Credential verification behind the [`Authenticator`] trait.

pub mod credentials;
#[cfg(feature = "pam")]
pub mod pam;
pub mod validator;

pub use credentials::CredentialStore;
pub use validator::{Authenticator, StaticAuthenticator, from_config};
