//! Error types
//!
//! Defines domain-specific error types for each module of the server.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Shell executor errors
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    /// The command ran and exited non-zero. `stderr` is the raw text.
    #[error("command exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },
}

/// Filesystem operation errors
///
/// Classified variants carry a fixed phrase; `Generic` carries the cleaned
/// command output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("{0}")]
    InvalidPath(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    NotADirectory(String),
    #[error("{0}")]
    IsADirectory(String),
    #[error("{0}")]
    UnsupportedType(String),
    #[error("command timed out after {0}s")]
    Timeout(u64),
    #[error("{0}")]
    Generic(String),
    #[error("{0}")]
    Internal(String),
}

impl From<ExecError> for FsError {
    fn from(error: ExecError) -> Self {
        match error {
            ExecError::Failed { stderr, .. } => crate::shell::classify(&stderr),
            ExecError::Timeout { timeout, .. } => FsError::Timeout(timeout.as_secs()),
            other @ (ExecError::Spawn { .. } | ExecError::Io { .. }) => {
                FsError::Internal(other.to_string())
            }
        }
    }
}

/// Authentication errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication required")]
    MissingCredentials,
    #[error("invalid credentials for user: {0}")]
    InvalidCredentials(String),
    #[error("authentication backend failure: {0}")]
    Backend(String),
}

/// Startup and serving errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("authentication setup failed: {0}")]
    Auth(#[from] AuthError),
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_command_is_classified() {
        let err = ExecError::Failed {
            code: 2,
            stderr: "ls: cannot access '/tmp/x': No such file or directory\n".into(),
        };
        assert_eq!(
            FsError::from(err),
            FsError::NotFound("no such file or directory".into())
        );
    }

    #[test]
    fn spawn_failure_is_internal() {
        let err = ExecError::Spawn {
            program: "nope".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(matches!(FsError::from(err), FsError::Internal(_)));
    }

    #[test]
    fn timeout_keeps_duration() {
        let err = ExecError::Timeout {
            program: "tar".into(),
            timeout: Duration::from_secs(7),
        };
        assert_eq!(FsError::from(err), FsError::Timeout(7));
    }

    #[test]
    fn timeout_message_keeps_sub_second_precision() {
        let err = ExecError::Timeout {
            program: "sh".into(),
            timeout: Duration::from_millis(200),
        };
        assert_eq!(err.to_string(), "sh did not finish within 200ms");
    }
}
