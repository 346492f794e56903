//! Dataprep Ingest Library
//!
//! Makes a remote zipped dataset available on local disk in extracted form,
//! skipping redundant network and disk work on repeated runs.
//!
//! # Example
//!
//! ```no_run
//! use dataprep_ingest::config::PipelineConfig;
//! use dataprep_ingest::ingestion::DataIngestion;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = PipelineConfig::load("pipeline.yml")?;
//!     let ingestion = DataIngestion::new(pipeline.data_ingestion);
//!     ingestion.fetch().await?;
//!     ingestion.extract().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ingestion;

pub use error::{IngestError, Result};
