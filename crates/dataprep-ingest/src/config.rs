//! Pipeline configuration loading
//!
//! Deserializes one YAML file holding a section per stage into the
//! immutable config entities from `dataprep-common`.

use crate::error::{IngestError, Result};
use dataprep_common::types::{
    DataIngestionConfig, DataTransformationConfig, DataValidationConfig,
};
use serde::Deserialize;
use std::path::Path;

/// Default pipeline config file when not specified via CLI or environment.
pub const DEFAULT_CONFIG_FILE: &str = "pipeline.yml";

/// Top-level pipeline configuration, one section per stage
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    pub data_ingestion: DataIngestionConfig,
    pub data_validation: DataValidationConfig,
    pub data_transformation: DataTransformationConfig,
}

impl PipelineConfig {
    /// Load the pipeline configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            IngestError::config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the config file path: `DATAPREP_CONFIG` takes precedence
    /// over the given path.
    pub fn resolve_path(cli_path: &str) -> String {
        std::env::var("DATAPREP_CONFIG").unwrap_or_else(|_| cli_path.to_string())
    }
}
