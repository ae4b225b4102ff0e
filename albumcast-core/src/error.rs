use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Coarse classification of a [`RelayError`], for callers that want to decide
/// whether an operation is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network trouble, throttling or a 5xx from the remote side.
    Transient,
    /// The remote side understood the request and refused it.
    Permanent,
    /// Local filesystem failure.
    Filesystem,
    /// Missing or malformed settings.
    Config,
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Network error during {operation}: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Rate limited during {operation}, retry after {retry_after:?}")]
    RateLimited {
        operation: &'static str,
        retry_after: Option<Duration>,
    },

    #[error("Server error {status} during {operation}: {message}")]
    ServerError {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },

    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::RateLimited { .. } | Self::ServerError { .. } => {
                ErrorKind::Transient
            }
            Self::Rejected { .. } => ErrorKind::Permanent,
            Self::Filesystem { .. } => ErrorKind::Filesystem,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub fn network(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Network { operation, source }
    }

    pub fn rejected(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            message: message.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Map a non-success HTTP status plus the remote's description onto an error.
    pub fn from_status(
        operation: &'static str,
        status: u16,
        message: impl Into<String>,
        retry_after: Option<Duration>,
    ) -> Self {
        match status {
            429 => Self::RateLimited {
                operation,
                retry_after,
            },
            500..=599 => Self::ServerError {
                operation,
                status,
                message: message.into(),
            },
            _ => Self::rejected(operation, message),
        }
    }
}
