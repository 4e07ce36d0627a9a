//! Provider error model.

use thiserror::Error;

use crate::version::ApiVersion;

/// Result type used across the provider.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// HTTP status the cluster uses for a role that does not exist.
pub const NOT_FOUND_STATUS: u16 = 404;

/// Provider-level error.
///
/// Only `Cluster` carries an HTTP status; a 404 there is the one status the
/// lifecycle layer inspects (see [`ProviderError::is_not_found`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The injected client handle is not one of the supported versions.
    #[error("unhandled client type: {0}")]
    UnhandledClientType(String),

    /// The client version predates the role management API.
    #[error("unsupported in elasticsearch {0} client")]
    Unsupported(ApiVersion),

    /// The cluster answered with a non-success status.
    #[error("elasticsearch {version} returned status {status}: {reason}")]
    Cluster {
        version: ApiVersion,
        status: u16,
        reason: String,
    },

    /// The request never produced a response (connect, IO, TLS).
    #[error("transport error: {0}")]
    Transport(String),

    /// A document could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The declarative configuration violates the resource schema.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Client configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ProviderError {
    pub fn unhandled_client(msg: impl Into<String>) -> Self {
        Self::UnhandledClientType(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Status code reported by the cluster, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Cluster { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the cluster reported the role as missing, whatever the client version.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(NOT_FOUND_STATUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_recognised_for_every_version() {
        for version in [ApiVersion::V5, ApiVersion::V6, ApiVersion::V7] {
            let err = ProviderError::Cluster {
                version,
                status: 404,
                reason: "role not found".to_string(),
            };
            assert!(err.is_not_found());
        }
    }

    #[test]
    fn other_errors_are_not_not_found() {
        let server = ProviderError::Cluster {
            version: ApiVersion::V7,
            status: 500,
            reason: "boom".to_string(),
        };
        assert!(!server.is_not_found());
        assert!(!ProviderError::unhandled_client("x").is_not_found());
        assert!(!ProviderError::Unsupported(ApiVersion::V5).is_not_found());
    }

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            ProviderError::Unsupported(ApiVersion::V5).to_string(),
            "unsupported in elasticsearch v5 client"
        );
        assert!(
            ProviderError::unhandled_client("elasticsearch 8.11.0")
                .to_string()
                .starts_with("unhandled client type")
        );
    }
}
