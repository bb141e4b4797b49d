// SPDX-License-Identifier: GPL-3.0-only

//! Storage utilities for the photo album

use crate::constants::photo;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::{debug, info};

/// Get the photo album directory (`<XDG pictures dir>/Viewfinder`)
pub fn photo_directory() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(photo::ALBUM_FOLDER)
}

/// Ensure the photo album directory exists, creating it if necessary
pub fn ensure_photo_directory() -> std::io::Result<PathBuf> {
    let photo_dir = photo_directory();
    std::fs::create_dir_all(&photo_dir)?;
    info!(path = %photo_dir.display(), "Photo directory ready");
    Ok(photo_dir)
}

/// Build the filename for a photo taken at `time`.
///
/// Millisecond-precision local timestamps keep consecutive captures from
/// colliding; an identical timestamp overwrites the earlier file.
pub fn photo_filename(time: DateTime<Local>) -> String {
    format!("{}.jpg", time.format(photo::FILENAME_TIMESTAMP))
}

/// Load the latest photo in the album as a thumbnail for the gallery button.
///
/// Scans the album for JPEG and PNG files and loads the most recently
/// modified one as an image handle.
pub async fn load_latest_thumbnail(photos_dir: PathBuf) -> Option<cosmic::widget::image::Handle> {
    // Get list of photo files (using blocking std::fs)
    let mut entries = tokio::task::spawn_blocking(move || {
        let mut files = Vec::new();
        if let Ok(entries) = std::fs::read_dir(&photos_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if let Some(ext) = path.extension() {
                    let ext_str = ext.to_string_lossy();
                    if ext_str.eq_ignore_ascii_case("jpg") || ext_str.eq_ignore_ascii_case("png") {
                        files.push(entry);
                    }
                }
            }
        }
        files
    })
    .await
    .ok()?;

    if entries.is_empty() {
        return None;
    }

    // Sort by modification time (newest first)
    entries.sort_by_key(|e| {
        e.metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .map(std::cmp::Reverse)
    });

    let latest_path = entries.first()?.path();

    debug!(path = ?latest_path, "Loading latest thumbnail");

    let bytes = tokio::fs::read(&latest_path).await.ok()?;

    Some(cosmic::widget::image::Handle::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_photo_filename_format() {
        let time = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(678);
        assert_eq!(photo_filename(time), "2024-01-02-03-04-05-678.jpg");
    }

    #[test]
    fn test_photo_filename_millisecond_precision() {
        let base = Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let a = photo_filename(base + chrono::Duration::milliseconds(1));
        let b = photo_filename(base + chrono::Duration::milliseconds(2));
        assert_ne!(a, b, "consecutive captures must not collide");
    }

    #[test]
    fn test_photo_directory_ends_with_album() {
        let dir = photo_directory();
        assert!(dir.ends_with(crate::constants::photo::ALBUM_FOLDER));
    }
}
