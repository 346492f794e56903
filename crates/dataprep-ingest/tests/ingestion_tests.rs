//! Integration tests for the ingestion stage
//!
//! These tests validate the fetch/extract workflow end to end:
//! - download-if-absent and skip-if-present behavior
//! - transfer metadata reporting
//! - checksum verification
//! - error propagation for unreachable sources and bad archives

use dataprep_common::types::DataIngestionConfig;
use dataprep_ingest::ingestion::{DataIngestion, FetchOutcome};
use dataprep_ingest::IngestError;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::FileOptions;

/// Helper to build a zip archive in memory
fn sample_archive_bytes() -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = FileOptions::default();
        writer.start_file("train.csv", options).unwrap();
        writer.write_all(b"laufkont,laufzeit\n1,18\n2,12\n").unwrap();
        writer.start_file("test.csv", options).unwrap();
        writer.write_all(b"laufkont,laufzeit\n4,24\n").unwrap();
        writer.start_file("schema.json", options).unwrap();
        writer.write_all(b"{\"laufkont\":\"int64\"}").unwrap();
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// Helper to build a stage config pointing at the mock server
fn ingestion_config(server_url: &str, dir: &TempDir) -> DataIngestionConfig {
    DataIngestionConfig {
        root_dir: dir.path().to_path_buf(),
        source_url: Url::parse(&format!("{}/data.zip", server_url)).unwrap(),
        local_data_file: dir.path().join("data.zip"),
        unzip_dir: dir.path().join("unzipped"),
        expected_sha256: None,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

async fn mount_archive(server: &MockServer, body: Vec<u8>, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/data.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body, "application/zip"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_downloads_when_file_absent() {
    let server = MockServer::start().await;
    let archive = sample_archive_bytes();
    mount_archive(&server, archive.clone(), 1).await;

    let dir = TempDir::new().unwrap();
    let config = ingestion_config(&server.uri(), &dir);
    let ingestion = DataIngestion::new(config.clone());

    let outcome = ingestion.fetch().await.unwrap();
    match outcome {
        FetchOutcome::Downloaded {
            bytes,
            sha256,
            status,
            content_type,
            ..
        } => {
            assert_eq!(bytes, archive.len() as u64);
            assert_eq!(sha256, sha256_hex(&archive));
            assert_eq!(status, 200);
            assert_eq!(content_type.as_deref(), Some("application/zip"));
        },
        other => panic!("expected Downloaded, got {:?}", other),
    }

    assert_eq!(std::fs::read(&config.local_data_file).unwrap(), archive);
}

#[tokio::test]
async fn fetch_is_idempotent() {
    let server = MockServer::start().await;
    let archive = sample_archive_bytes();
    // Exactly one transfer across two fetch calls
    mount_archive(&server, archive.clone(), 1).await;

    let dir = TempDir::new().unwrap();
    let ingestion = DataIngestion::new(ingestion_config(&server.uri(), &dir));

    ingestion.fetch().await.unwrap();
    let first = std::fs::read(&ingestion.config().local_data_file).unwrap();

    let outcome = ingestion.fetch().await.unwrap();
    let second = std::fs::read(&ingestion.config().local_data_file).unwrap();

    assert!(matches!(outcome, FetchOutcome::AlreadyPresent { bytes } if bytes == archive.len() as u64));
    assert_eq!(first, second);
}

#[tokio::test]
async fn fetch_redownloads_zero_byte_leftover() {
    let server = MockServer::start().await;
    let archive = sample_archive_bytes();
    mount_archive(&server, archive.clone(), 1).await;

    let dir = TempDir::new().unwrap();
    let config = ingestion_config(&server.uri(), &dir);
    // Simulate the truncated leftover of an interrupted download
    std::fs::write(&config.local_data_file, b"").unwrap();

    let ingestion = DataIngestion::new(config.clone());
    let outcome = ingestion.fetch().await.unwrap();

    assert!(matches!(outcome, FetchOutcome::Downloaded { .. }));
    assert_eq!(std::fs::read(&config.local_data_file).unwrap(), archive);
}

#[tokio::test]
async fn fetch_fails_on_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let ingestion = DataIngestion::new(ingestion_config(&server.uri(), &dir));

    let err = ingestion.fetch().await.unwrap_err();
    assert!(matches!(err, IngestError::Retrieval { .. }));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn fetch_fails_on_unreachable_server() {
    let dir = TempDir::new().unwrap();
    let config = ingestion_config("http://127.0.0.1:1", &dir);

    let ingestion = DataIngestion::new(config);
    let err = ingestion.fetch().await.unwrap_err();
    assert!(matches!(err, IngestError::Retrieval { .. }));
}

#[tokio::test]
async fn fetch_verifies_expected_checksum() {
    let server = MockServer::start().await;
    let archive = sample_archive_bytes();
    mount_archive(&server, archive.clone(), 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = ingestion_config(&server.uri(), &dir);
    config.expected_sha256 = Some(sha256_hex(&archive));

    let ingestion = DataIngestion::new(config);
    let outcome = ingestion.fetch().await.unwrap();
    assert!(matches!(outcome, FetchOutcome::Downloaded { .. }));
}

#[tokio::test]
async fn fetch_rejects_checksum_mismatch() {
    let server = MockServer::start().await;
    let archive = sample_archive_bytes();
    mount_archive(&server, archive, 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = ingestion_config(&server.uri(), &dir);
    config.expected_sha256 = Some("0".repeat(64));

    let ingestion = DataIngestion::new(config);
    let err = ingestion.fetch().await.unwrap_err();
    assert!(matches!(err, IngestError::Retrieval { .. }));
    assert!(err.to_string().contains("checksum"));
}

#[tokio::test]
async fn fetch_rejects_stale_file_with_wrong_checksum() {
    // No network call should happen before the skip-path verification fails
    let dir = TempDir::new().unwrap();
    let mut config = ingestion_config("http://127.0.0.1:1", &dir);
    config.expected_sha256 = Some("0".repeat(64));
    std::fs::write(&config.local_data_file, b"stale partial download").unwrap();

    let ingestion = DataIngestion::new(config);
    let err = ingestion.fetch().await.unwrap_err();
    assert!(matches!(err, IngestError::Retrieval { .. }));
}

#[tokio::test]
async fn fetch_then_extract_round_trip() {
    let server = MockServer::start().await;
    let archive = sample_archive_bytes();
    mount_archive(&server, archive, 1).await;

    let dir = TempDir::new().unwrap();
    let config = ingestion_config(&server.uri(), &dir);
    let ingestion = DataIngestion::new(config.clone());

    ingestion.fetch().await.unwrap();
    let outcome = ingestion.extract().await.unwrap();

    assert_eq!(outcome.files_written, 3);
    let mut entries: Vec<PathBuf> = std::fs::read_dir(&config.unzip_dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    entries.sort();
    let names: Vec<&str> = entries
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(names, vec!["schema.json", "test.csv", "train.csv"]);
}

#[tokio::test]
async fn extract_missing_archive_leaves_destination_unpopulated() {
    let dir = TempDir::new().unwrap();
    let config = ingestion_config("http://127.0.0.1:1", &dir);
    let ingestion = DataIngestion::new(config.clone());

    let err = ingestion.extract().await.unwrap_err();
    assert!(matches!(err, IngestError::Extraction { .. }));
    assert!(is_empty_or_absent(&config.unzip_dir));
}

fn is_empty_or_absent(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}
