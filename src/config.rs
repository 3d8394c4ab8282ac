//! Configuration management for the filesystem API server
//!
//! Settings come from an optional `config.toml` overridden by environment
//! variables prefixed with `FS_API_`, using `__` between section and key:
//!
//! ```text
//! FS_API_SERVER__PORT=8080
//! FS_API_FILESYSTEM__SUPPORTED_PATHS=/tmp,/srv/share
//! ```
//!
//! The loaded configuration is read-only for the lifetime of the process.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Complete server configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub filesystem: FilesystemConfig,
    pub auth: AuthConfig,
}

/// HTTP listener and API surface settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    /// IP address to bind
    pub bind_address: String,

    pub port: u16,

    /// Prefix every route is mounted under
    pub application_root: String,

    /// Version string written into the OpenAPI document
    pub openapi_version: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
            application_root: "/".to_string(),
            openapi_version: "3.0.3".to_string(),
        }
    }
}

/// Filesystem access settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FilesystemConfig {
    /// Roots that requests may target
    pub supported_paths: Vec<String>,

    /// Run commands as the authenticated user through `sudo_program`
    pub impersonate: bool,

    pub sudo_program: String,

    /// Upper bound on a single external command
    pub command_timeout_secs: u64,

    /// Maximum request body for uploads
    pub max_upload_size_mb: u64,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            supported_paths: vec!["/tmp".to_string()],
            impersonate: true,
            sudo_program: "sudo".to_string(),
            command_timeout_secs: 30,
            max_upload_size_mb: 100,
        }
    }
}

/// Credential backend selection
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthBackend {
    /// Usernames and passwords listed in `auth.users`
    #[default]
    Static,
    /// Host accounts checked through PAM
    Pam,
}

/// Authentication settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub backend: AuthBackend,

    /// PAM service name used by the `pam` backend
    pub pam_service: String,

    /// Credential store for the `static` backend
    pub users: HashMap<String, String>,

    pub max_credential_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backend: AuthBackend::Static,
            pam_service: "login".to_string(),
            users: HashMap::new(),
            max_credential_length: 256,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        // Packaged layout first, then the working directory
        let config_paths = ["fs-api-server/config", "config"];

        let mut builder = Config::builder();
        for config_path in config_paths {
            builder = builder.add_source(File::with_name(config_path).required(false));
        }
        Self::from_builder(builder.add_source(
            Environment::with_prefix("FS_API")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("filesystem.supported_paths")
                .try_parsing(true),
        ))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: ServerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if !self.server.application_root.starts_with('/') {
            return Err(ConfigError::Message(
                "application_root must start with '/'".into(),
            ));
        }

        if self.filesystem.supported_paths.is_empty() {
            return Err(ConfigError::Message(
                "supported_paths cannot be empty".into(),
            ));
        }

        if let Some(path) = self
            .filesystem
            .supported_paths
            .iter()
            .find(|path| !path.starts_with('/'))
        {
            return Err(ConfigError::Message(format!(
                "supported path must be absolute: {path}"
            )));
        }

        if self.filesystem.command_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "command_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.filesystem.max_upload_size_mb == 0 {
            return Err(ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        if self.auth.backend == AuthBackend::Pam && !cfg!(feature = "pam") {
            return Err(ConfigError::Message(
                "auth backend 'pam' requires building with the 'pam' feature".into(),
            ));
        }

        Ok(())
    }
}

impl HttpConfig {
    /// Get bind address and port as socket address
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Application root without a trailing slash; `None` when mounted at `/`.
    pub fn mount_point(&self) -> Option<String> {
        let trimmed = self.application_root.trim_end_matches('/');
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

impl FilesystemConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<ServerConfig, ConfigError> {
        ServerConfig::from_builder(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.server.socket_addr(), "127.0.0.1:5000");
        assert_eq!(config.server.openapi_version, "3.0.3");
        assert_eq!(config.filesystem.supported_paths, ["/tmp"]);
        assert!(config.filesystem.impersonate);
        assert_eq!(config.filesystem.command_timeout(), Duration::from_secs(30));
        assert_eq!(config.auth.backend, AuthBackend::Static);
    }

    #[test]
    fn reads_sections() {
        let config = parse(
            r#"
            [server]
            port = 8080
            application_root = "/api/"

            [filesystem]
            supported_paths = ["/srv", "/data"]
            impersonate = false
            max_upload_size_mb = 2

            [auth.users]
            alice = "alice123"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.mount_point().as_deref(), Some("/api"));
        assert_eq!(config.filesystem.supported_paths, ["/srv", "/data"]);
        assert!(!config.filesystem.impersonate);
        assert_eq!(config.filesystem.max_upload_size_bytes(), 2 * 1024 * 1024);
        assert_eq!(config.auth.users["alice"], "alice123");
    }

    #[test]
    fn root_mount_point_is_none() {
        assert_eq!(HttpConfig::default().mount_point(), None);
    }

    #[test]
    fn rejects_invalid_values() {
        for toml in [
            "[server]\nport = 0",
            "[server]\napplication_root = \"api\"",
            "[filesystem]\nsupported_paths = []",
            "[filesystem]\nsupported_paths = [\"relative\"]",
            "[filesystem]\ncommand_timeout_secs = 0",
            "[filesystem]\nmax_upload_size_mb = 0",
        ] {
            assert!(parse(toml).is_err(), "{toml}");
        }
    }

    #[cfg(not(feature = "pam"))]
    #[test]
    fn pam_backend_needs_feature() {
        assert!(parse("[auth]\nbackend = \"pam\"").is_err());
    }
}
