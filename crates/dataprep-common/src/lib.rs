//! Dataprep Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the dataprep pipeline.
//!
//! # Overview
//!
//! This crate provides common functionality used across all dataprep
//! workspace members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Logging**: tracing-based logging initialization
//! - **Checksums**: File integrity verification utilities
//! - **Types**: Immutable per-stage configuration entities
//!
//! # Example
//!
//! ```no_run
//! use dataprep_common::{Result, PipelineError};
//! use dataprep_common::checksum::{compute_file_checksum, ChecksumAlgorithm};
//!
//! fn fingerprint(path: &str) -> Result<()> {
//!     let digest = compute_file_checksum(path, ChecksumAlgorithm::Sha256)?;
//!     println!("File digest: {}", digest);
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{PipelineError, Result};
