//! Error types for the Hemmer bridge.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reconciling a bridged provider with its history.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The provider version is not a semantic version.
    #[error("Invalid provider version '{version}': {source}")]
    InvalidVersion {
        /// The version string as configured.
        version: String,
        /// The underlying parse failure.
        #[source]
        source: semver::Error,
    },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing the metadata file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Auto-aliasing needs a metadata document to read and write history.
    #[error("Provider metadata is missing: {0}")]
    MissingMetadata(String),
}

impl BridgeError {
    /// Get the error message as a string.
    ///
    /// Variants wrapping another error return a fixed description; use the
    /// `Display` or `Debug` output for the details.
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidVersion { .. } => "invalid provider version (see Debug output)",
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Io { .. } => "i/o error (see Debug output)",
            Self::MissingMetadata(msg) => msg,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the bridge.
pub type Result<T> = std::result::Result<T, BridgeError>;
