//! Error types for the ingestion stage
//!
//! The two operation errors, `Retrieval` and `Extraction`, are the only
//! kinds `fetch()` and `extract()` produce; the remaining variants belong
//! to configuration loading. Nothing here retries or recovers — errors
//! propagate to the caller.

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error type for the ingestion stage
#[derive(Error, Debug)]
pub enum IngestError {
    /// Downloading the remote dataset failed (network, HTTP status, or
    /// disk write)
    #[error("Retrieval failed for '{url}': {reason}. Check the source URL, your network connection, and free disk space.")]
    Retrieval { url: String, reason: String },

    /// Unpacking the local archive failed (missing, unreadable, or not a
    /// valid zip)
    #[error("Extraction failed for '{archive}': {reason}. Re-run fetch to download the archive again.")]
    Extraction { archive: String, reason: String },

    /// Pipeline configuration is missing or invalid
    #[error("Configuration error: {0}. Check the pipeline config file or the DATAPREP_CONFIG environment variable.")]
    Config(String),

    /// YAML parsing failed
    #[error("Failed to parse pipeline config: {0}. Check the file syntax at the indicated line/column.")]
    YamlParse(#[from] serde_yaml::Error),
}

impl IngestError {
    /// Create a retrieval error
    pub fn retrieval(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Retrieval {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an extraction error
    pub fn extraction(archive: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Extraction {
            archive: archive.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
