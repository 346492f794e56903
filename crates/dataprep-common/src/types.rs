//! Immutable configuration entities for the pipeline stages
//!
//! One record per stage, produced once by configuration loading and passed
//! by value or shared reference into the stage components. None of them
//! expose setters; construct fully, then only read.

use byte_unit::{Byte, UnitType};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use url::Url;

/// Configuration for the data ingestion stage.
///
/// `source_url` is parsed at construction time so a malformed URL fails at
/// config load rather than mid-fetch; whether the resource is actually
/// retrievable is only known at fetch time.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataIngestionConfig {
    /// Working directory for this stage's artifacts
    pub root_dir: PathBuf,

    /// Remote location of the zipped dataset
    pub source_url: Url,

    /// Where the downloaded archive is written
    pub local_data_file: PathBuf,

    /// Where the archive contents are extracted
    pub unzip_dir: PathBuf,

    /// Optional hex SHA-256 digest of the complete archive. When set, both
    /// the skip-if-present path and fresh downloads are verified against it.
    #[serde(default)]
    pub expected_sha256: Option<String>,
}

/// Configuration for the data validation stage.
///
/// The schema maps column names to expected dtype strings; its contents are
/// not interpreted by this crate.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataValidationConfig {
    pub root_dir: PathBuf,
    pub unzip_data_dir: String,
    pub status_file: String,
    pub schema: BTreeMap<String, String>,
}

/// Configuration for the data transformation stage.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataTransformationConfig {
    pub root_dir: PathBuf,
    pub data_path: PathBuf,
}

/// Format a byte count for log output, e.g. `1.00 KiB`
pub fn human_size(bytes: u64) -> String {
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{adjusted:.2}")
}
