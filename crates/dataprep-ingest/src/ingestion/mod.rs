//! Data ingestion stage: download-if-absent, then extract
//!
//! `DataIngestion` owns a [`DataIngestionConfig`] and touches only the
//! paths named in it. `fetch()` is a no-op when the archive is already on
//! disk; `extract()` always re-extracts, overwriting the destination.

use crate::error::{IngestError, Result};
use chrono::{DateTime, Utc};
use dataprep_common::checksum::{compute_file_checksum, ChecksumAlgorithm};
use dataprep_common::types::{human_size, DataIngestionConfig};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Result of a [`DataIngestion::fetch`] call
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The archive was downloaded from the remote source
    Downloaded {
        /// Bytes written to the local data file
        bytes: u64,
        /// Hex SHA-256 digest of the written file
        sha256: String,
        /// HTTP status of the response
        status: u16,
        /// Content-Type response header, if present
        content_type: Option<String>,
        /// Content-Length response header, if present
        content_length: Option<u64>,
        /// When the transfer completed
        fetched_at: DateTime<Utc>,
    },
    /// A non-empty archive was already on disk; no network call was made
    AlreadyPresent {
        /// Size of the existing file in bytes
        bytes: u64,
    },
}

impl FetchOutcome {
    /// Size of the local data file after the call, in bytes
    pub fn bytes(&self) -> u64 {
        match self {
            FetchOutcome::Downloaded { bytes, .. } => *bytes,
            FetchOutcome::AlreadyPresent { bytes } => *bytes,
        }
    }
}

/// Result of a [`DataIngestion::extract`] call
#[derive(Debug, Clone, Copy)]
pub struct ExtractOutcome {
    /// Number of file entries written into the destination
    pub files_written: u64,
}

/// Ingestion stage component
#[derive(Debug)]
pub struct DataIngestion {
    config: DataIngestionConfig,
}

impl DataIngestion {
    /// Create an ingestion component for the given stage config
    pub fn new(config: DataIngestionConfig) -> Self {
        Self { config }
    }

    /// The stage config this component operates on
    pub fn config(&self) -> &DataIngestionConfig {
        &self.config
    }

    /// Download the dataset archive to `local_data_file` unless a non-empty
    /// copy is already present.
    ///
    /// A zero-byte file (the leftover of an interrupted download) does not
    /// count as present and is re-downloaded. When
    /// `expected_sha256` is configured, both the existing file and a fresh
    /// download are verified against it.
    ///
    /// On success the local data file exists and is non-empty.
    pub async fn fetch(&self) -> Result<FetchOutcome> {
        let url = self.config.source_url.as_str();
        let path = &self.config.local_data_file;

        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > 0 => {
                self.verify_expected_digest(path)?;
                info!(
                    path = %path.display(),
                    size = %human_size(meta.len()),
                    "Local data file already exists, skipping download"
                );
                return Ok(FetchOutcome::AlreadyPresent { bytes: meta.len() });
            },
            Ok(_) => {
                warn!(
                    path = %path.display(),
                    "Local data file is empty, re-downloading"
                );
            },
            Err(_) => {},
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| IngestError::retrieval(url, e))?;
        }

        let response = reqwest::get(self.config.source_url.clone())
            .await
            .map_err(|e| IngestError::retrieval(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::retrieval(
                url,
                format!("server responded with HTTP {}", status),
            ));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_length = response.content_length();

        let bytes = self
            .write_body(response, path)
            .await
            .map_err(|e| IngestError::retrieval(url, e))?;

        if bytes == 0 {
            return Err(IngestError::retrieval(url, "response body was empty"));
        }

        let sha256 = compute_file_checksum(path, ChecksumAlgorithm::Sha256)
            .map_err(|e| IngestError::retrieval(url, e))?;
        if let Some(ref expected) = self.config.expected_sha256 {
            if !sha256.eq_ignore_ascii_case(expected) {
                return Err(IngestError::retrieval(
                    url,
                    format!("checksum mismatch: expected {}, got {}", expected, sha256),
                ));
            }
        }

        let fetched_at = Utc::now();
        info!(
            url,
            path = %path.display(),
            size = %human_size(bytes),
            sha256 = %sha256,
            status = status.as_u16(),
            content_type = content_type.as_deref().unwrap_or("unknown"),
            "Downloaded dataset archive"
        );

        Ok(FetchOutcome::Downloaded {
            bytes,
            sha256,
            status: status.as_u16(),
            content_type,
            content_length,
            fetched_at,
        })
    }

    /// Ensure `unzip_dir` exists, then unpack the full archive into it,
    /// preserving relative paths and overwriting existing files.
    ///
    /// Re-running always re-extracts; the final directory contents are the
    /// same as after a single run.
    pub async fn extract(&self) -> Result<ExtractOutcome> {
        let archive_path = &self.config.local_data_file;
        let unzip_dir = &self.config.unzip_dir;
        let archive_name = archive_path.to_string_lossy().to_string();

        std::fs::create_dir_all(unzip_dir)
            .map_err(|e| IngestError::extraction(&archive_name, e))?;

        let file = std::fs::File::open(archive_path)
            .map_err(|e| IngestError::extraction(&archive_name, e))?;
        let mut archive = ZipArchive::new(file)
            .map_err(|e| IngestError::extraction(&archive_name, e))?;

        let mut files_written = 0u64;
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| IngestError::extraction(&archive_name, e))?;

            // Reject entries that would land outside the destination
            let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
                warn!(entry = %entry.name(), "Skipping archive entry with unsafe path");
                continue;
            };
            let target = unzip_dir.join(&relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&target)
                    .map_err(|e| IngestError::extraction(&archive_name, e))?;
                continue;
            }

            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| IngestError::extraction(&archive_name, e))?;
            }
            let mut out = std::fs::File::create(&target)
                .map_err(|e| IngestError::extraction(&archive_name, e))?;
            std::io::copy(&mut entry, &mut out)
                .map_err(|e| IngestError::extraction(&archive_name, e))?;

            debug!(entry = %relative.display(), "Extracted archive entry");
            files_written += 1;
        }

        info!(
            archive = %archive_path.display(),
            destination = %unzip_dir.display(),
            files = files_written,
            "Extracted dataset archive"
        );

        Ok(ExtractOutcome { files_written })
    }

    /// Verify an already-present file against the configured digest, if any
    fn verify_expected_digest(&self, path: &Path) -> Result<()> {
        let Some(ref expected) = self.config.expected_sha256 else {
            return Ok(());
        };
        dataprep_common::checksum::verify_file_checksum(
            path,
            expected,
            ChecksumAlgorithm::Sha256,
        )
        .map_err(|e| IngestError::retrieval(self.config.source_url.as_str(), e))?;
        Ok(())
    }

    /// Stream the response body to disk with a progress bar
    async fn write_body(
        &self,
        response: reqwest::Response,
        path: &Path,
    ) -> anyhow::Result<u64> {
        let total_size = response.content_length().unwrap_or(0);

        let pb = ProgressBar::new(total_size);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(format!("Downloading {}", path.display()));

        let mut file = std::fs::File::create(path)?;
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        pb.finish_and_clear();
        Ok(downloaded)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use url::Url;
    use zip::write::FileOptions;

    fn test_config(dir: &TempDir) -> DataIngestionConfig {
        DataIngestionConfig {
            root_dir: dir.path().to_path_buf(),
            source_url: Url::parse("https://example.test/data.zip").unwrap(),
            local_data_file: dir.path().join("data.zip"),
            unzip_dir: dir.path().join("unzipped"),
            expected_sha256: None,
        }
    }

    fn write_sample_archive(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = FileOptions::default();

        writer.start_file("train.csv", options).unwrap();
        writer.write_all(b"laufkont,laufzeit\n1,18\n").unwrap();
        writer.start_file("test.csv", options).unwrap();
        writer.write_all(b"laufkont,laufzeit\n2,24\n").unwrap();
        writer.add_directory("meta", options).unwrap();
        writer.start_file("meta/schema.json", options).unwrap();
        writer.write_all(b"{\"laufkont\":\"int64\"}").unwrap();
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_extract_preserves_relative_paths() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        write_sample_archive(&config.local_data_file);

        let ingestion = DataIngestion::new(config.clone());
        let outcome = ingestion.extract().await.unwrap();

        assert_eq!(outcome.files_written, 3);
        assert!(config.unzip_dir.join("train.csv").is_file());
        assert!(config.unzip_dir.join("test.csv").is_file());
        assert!(config.unzip_dir.join("meta/schema.json").is_file());
        assert_eq!(
            std::fs::read_to_string(config.unzip_dir.join("meta/schema.json")).unwrap(),
            "{\"laufkont\":\"int64\"}"
        );
    }

    #[tokio::test]
    async fn test_extract_twice_is_content_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        write_sample_archive(&config.local_data_file);

        let ingestion = DataIngestion::new(config.clone());
        ingestion.extract().await.unwrap();
        let first = std::fs::read(config.unzip_dir.join("train.csv")).unwrap();

        let outcome = ingestion.extract().await.unwrap();
        let second = std::fs::read(config.unzip_dir.join("train.csv")).unwrap();

        assert_eq!(outcome.files_written, 3);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_extract_missing_archive_fails() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        let ingestion = DataIngestion::new(config.clone());
        let err = ingestion.extract().await.unwrap_err();

        assert!(matches!(err, IngestError::Extraction { .. }));
        // At most directory-created, never populated
        let entries: Vec<_> = std::fs::read_dir(&config.unzip_dir)
            .map(|rd| rd.collect())
            .unwrap_or_default();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_extract_corrupt_archive_fails() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        std::fs::write(&config.local_data_file, b"this is not a zip archive").unwrap();

        let ingestion = DataIngestion::new(config);
        let err = ingestion.extract().await.unwrap_err();
        assert!(matches!(err, IngestError::Extraction { .. }));
    }
}
