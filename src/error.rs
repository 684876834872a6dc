//! Library error types

use std::path::PathBuf;

/// Failure reported by a lookup collaborator.
///
/// This is the only error the append transform surfaces; it is passed to
/// the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The HTTP client could not be built.
    #[error("failed to build registry client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request for a package never produced a response.
    #[error("request for `{name}` failed: {source}")]
    Http {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    /// The registry answered with an unexpected status.
    #[error("registry returned {status} for `{name}`")]
    Status { name: String, status: u16 },

    /// The registry answered with a body that is not package metadata.
    #[error("invalid registry response for `{name}`: {source}")]
    Decode {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    /// Any other collaborator-defined failure.
    #[error("{0}")]
    Other(String),
}

/// Failure loading a config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
