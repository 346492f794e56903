//! Error types shared across the dataprep workspace

use thiserror::Error;

/// Result type alias for dataprep operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for shared pipeline utilities
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checksum mismatch for '{file}': expected {expected}, got {actual}. The file may be truncated or corrupted; delete it and fetch again.")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a checksum mismatch error
    pub fn checksum_mismatch(
        file: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ChecksumMismatch {
            file: file.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
