// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the photo album storage module

use chrono::TimeZone;
use viewfinder::storage;

#[test]
fn test_photo_filename_matches_album_pattern() {
    let time = chrono::Local.with_ymd_and_hms(2024, 3, 9, 18, 25, 43).unwrap()
        + chrono::Duration::milliseconds(511);

    assert_eq!(storage::photo_filename(time), "2024-03-09-18-25-43-511.jpg");
}

#[test]
fn test_photo_filename_zero_pads_milliseconds() {
    let time = chrono::Local.with_ymd_and_hms(2024, 3, 9, 18, 25, 43).unwrap()
        + chrono::Duration::milliseconds(7);

    assert_eq!(storage::photo_filename(time), "2024-03-09-18-25-43-007.jpg");
}

#[tokio::test]
async fn test_latest_thumbnail_empty_dir() {
    let dir = tempfile::tempdir().unwrap();

    let thumbnail = storage::load_latest_thumbnail(dir.path().to_path_buf()).await;
    assert!(thumbnail.is_none());
}

#[tokio::test]
async fn test_latest_thumbnail_ignores_non_images() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"not a photo").unwrap();

    let thumbnail = storage::load_latest_thumbnail(dir.path().to_path_buf()).await;
    assert!(thumbnail.is_none());
}

#[tokio::test]
async fn test_latest_thumbnail_finds_photo() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("2024-03-09-18-25-43-511.jpg"), b"\xFF\xD8fake").unwrap();

    let thumbnail = storage::load_latest_thumbnail(dir.path().to_path_buf()).await;
    assert!(thumbnail.is_some());
}
