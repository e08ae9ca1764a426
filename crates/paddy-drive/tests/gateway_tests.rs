// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway behavior against the in-memory drive.

use std::sync::Arc;
use std::time::Duration;

use paddy_drive::{DriveGateway, UploadError};
use paddy_resilience::RetryPolicy;
use paddy_test_utils::mock_drive::ROOT_ID;
use paddy_test_utils::{DriveCall, MockDriveBackend};

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, 2.0).with_unit(Duration::from_millis(1))
}

fn gateway(drive: &Arc<MockDriveBackend>) -> DriveGateway {
    DriveGateway::new(drive.clone(), ROOT_ID, fast_retry())
}

fn write_photo(dir: &std::path::Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\xFF\xD8jpeg").unwrap();
    path
}

#[tokio::test]
async fn upload_creates_region_first_path() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    let gw = gateway(&drive);
    let photo = write_photo(dir.path(), "KDL-sokha-03_20260315_01.jpg");

    let remote = gw
        .upload_file(&photo, "Kandal/KDL-sokha-03/20260315")
        .await
        .unwrap();

    assert!(remote.web_link.is_some());
    assert_eq!(
        drive.folder_paths().await,
        vec![
            "Kandal",
            "Kandal/KDL-sokha-03",
            "Kandal/KDL-sokha-03/20260315"
        ]
    );
    assert_eq!(
        drive.uploads().await,
        vec!["Kandal/KDL-sokha-03/20260315/KDL-sokha-03_20260315_01.jpg"]
    );
}

#[tokio::test]
async fn repeated_paths_hit_the_folder_cache() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    let gw = gateway(&drive);
    let first = write_photo(dir.path(), "a.jpg");
    let second = write_photo(dir.path(), "b.jpg");

    gw.upload_file(&first, "Kandal/KDL-sokha-03/20260315").await.unwrap();
    let calls_after_first = drive.calls().await.len();
    gw.upload_file(&second, "Kandal/KDL-sokha-03/20260315").await.unwrap();

    let calls = drive.calls().await;
    // Only the file creation reaches the backend the second time.
    assert_eq!(calls.len(), calls_after_first + 1);
    assert!(matches!(calls.last(), Some(DriveCall::CreateFile { .. })));
    assert_eq!(gw.cached_folder_count().await, 3);
}

#[tokio::test]
async fn existing_folders_are_reused_not_duplicated() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    drive.seed_folder("Kandal", ROOT_ID).await;

    let gw = gateway(&drive);
    gw.upload_file(&write_photo(dir.path(), "a.jpg"), "Kandal/F")
        .await
        .unwrap();

    assert_eq!(drive.folders_created().await, 1);
    assert_eq!(drive.folder_paths().await, vec!["Kandal", "Kandal/F"]);
}

#[tokio::test]
async fn separate_gateways_resolve_to_the_same_folders() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    gateway(&drive)
        .upload_file(&write_photo(dir.path(), "a.jpg"), "Takeo/TKO-x-01/20260101")
        .await
        .unwrap();
    gateway(&drive)
        .upload_file(&write_photo(dir.path(), "b.jpg"), "Takeo/TKO-x-01/20260101")
        .await
        .unwrap();

    assert_eq!(drive.folders_created().await, 3);
}

#[tokio::test]
async fn missing_local_file_is_reported_without_backend_calls() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    let gw = gateway(&drive);

    let err = gw
        .upload_file(&dir.path().join("gone.jpg"), "Kandal")
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::MissingFile { .. }));
    assert!(drive.calls().await.is_empty());
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    drive.fail_next(2, true).await;
    let gw = gateway(&drive);

    gw.upload_file(&write_photo(dir.path(), "a.jpg"), "Kandal")
        .await
        .unwrap();

    assert_eq!(drive.uploads().await, vec!["Kandal/a.jpg"]);
}

#[tokio::test]
async fn transient_failures_beyond_attempts_give_up() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    drive.fail_next(3, true).await;
    let gw = gateway(&drive);

    let err = gw
        .upload_file(&write_photo(dir.path(), "a.jpg"), "Kandal")
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Backend { transient: true, .. }));
    assert_eq!(drive.calls().await.len(), 3);
}

#[tokio::test]
async fn permanent_failure_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    drive.fail_next(1, false).await;
    let gw = gateway(&drive);

    let err = gw
        .upload_file(&write_photo(dir.path(), "a.jpg"), "Kandal")
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Backend { transient: false, .. }));
    assert_eq!(drive.calls().await.len(), 1);
    assert_eq!(drive.file_count().await, 0);
}

#[tokio::test]
async fn named_file_is_replaced_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let drive = Arc::new(MockDriveBackend::new());
    let gw = gateway(&drive);
    let log = dir.path().join("farm_surveys.csv");

    std::fs::write(&log, "header\nrow1\n").unwrap();
    let first = gw.upload_or_replace_named_file(&log, "Surveys").await.unwrap();
    std::fs::write(&log, "header\nrow1\nrow2\n").unwrap();
    let second = gw.upload_or_replace_named_file(&log, "Surveys").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(drive.file_count().await, 1);
    assert_eq!(
        drive.file_content("Surveys/farm_surveys.csv").await.unwrap(),
        b"header\nrow1\nrow2\n"
    );
}

#[tokio::test]
async fn clearing_the_cache_forces_lookups() {
    let drive = Arc::new(MockDriveBackend::new());
    let gw = gateway(&drive);
    gw.resolve_folder_path("Kandal/F").await.unwrap();
    gw.clear_folder_cache().await;
    assert_eq!(gw.cached_folder_count().await, 0);

    let before = drive.calls().await.len();
    let id = gw.resolve_folder_path("Kandal").await.unwrap();
    let after = drive.calls().await;
    assert_eq!(after.len(), before + 1);
    assert!(matches!(after.last(), Some(DriveCall::FindFolder { .. })));
    assert!(id.starts_with("folder-"));
    assert_eq!(drive.folders_created().await, 2);
}

#[tokio::test]
async fn empty_path_resolves_to_root() {
    let drive = Arc::new(MockDriveBackend::new());
    let gw = gateway(&drive);
    assert_eq!(gw.resolve_folder_path("").await.unwrap(), ROOT_ID);
    assert_eq!(gw.resolve_folder_path("/").await.unwrap(), ROOT_ID);
}
