// SPDX-License-Identifier: GPL-3.0-only

//! Post-processing for captured frames
//!
//! Converts the preview's RGBA frames to RGB for encoding, and provides the
//! scene brightness estimate that drives the auto flash decision.

use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use image::RgbImage;
use std::sync::Arc;
use tracing::{debug, info};

/// Processed image data ready for encoding
pub struct ProcessedImage {
    pub image: RgbImage,
    pub width: u32,
    pub height: u32,
}

/// Post-processor for captured frames
pub struct PostProcessor;

impl PostProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Process a captured frame asynchronously
    ///
    /// # Arguments
    /// * `frame` - Raw camera frame (RGBA format)
    ///
    /// # Returns
    /// * `Ok(ProcessedImage)` - Processed RGB image
    /// * `Err(PhotoError)` - Error message
    pub async fn process(&self, frame: Arc<CameraFrame>) -> Result<ProcessedImage, PhotoError> {
        info!(
            width = frame.width,
            height = frame.height,
            "Starting post-processing"
        );

        let width = frame.width;
        let height = frame.height;

        // RGBA → RGB is CPU-bound on full-resolution frames
        let rgb_image = tokio::task::spawn_blocking(move || {
            convert_rgba_to_rgb(&frame.data, width, height)
        })
        .await
        .map_err(|e| PhotoError::CaptureFailed(format!("Post-processing task error: {}", e)))??;

        debug!("Post-processing complete");

        Ok(ProcessedImage {
            image: rgb_image,
            width,
            height,
        })
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert RGBA data to RGB image (drop alpha channel)
fn convert_rgba_to_rgb(rgba_data: &[u8], width: u32, height: u32) -> Result<RgbImage, PhotoError> {
    let expected_size = (width * height * 4) as usize;
    if rgba_data.len() < expected_size {
        return Err(PhotoError::CaptureFailed(format!(
            "RGBA data too small: expected {}, got {}",
            expected_size,
            rgba_data.len()
        )));
    }

    let rgb_data: Vec<u8> = rgba_data
        .chunks(4)
        .take((width * height) as usize)
        .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
        .collect();

    RgbImage::from_raw(width, height, rgb_data)
        .ok_or_else(|| PhotoError::CaptureFailed("Failed to build RGB image".to_string()))
}

/// Estimate scene brightness as mean luma in the 0.0 - 1.0 range.
///
/// Samples a subset of pixels; full-frame accuracy is not needed for the
/// auto flash decision.
pub fn estimate_scene_brightness(frame: &CameraFrame) -> f32 {
    let pixels = (frame.width * frame.height) as usize;
    if pixels == 0 || frame.data.len() < pixels * 4 {
        return 0.0;
    }

    // Sample roughly 10k pixels regardless of resolution
    let step = (pixels / 10_000).max(1);

    let mut sum = 0.0f64;
    let mut count = 0usize;
    for i in (0..pixels).step_by(step) {
        let offset = i * 4;
        let r = frame.data[offset] as f64;
        let g = frame.data[offset + 1] as f64;
        let b = frame.data[offset + 2] as f64;
        // Rec. 601 luma weights
        sum += 0.299 * r + 0.587 * g + 0.114 * b;
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }

    (sum / count as f64 / 255.0) as f32
}

/// Mirror RGBA rows horizontally (used for the selfie preview)
pub fn mirror_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let row_bytes = width as usize * 4;
    let mut mirrored = Vec::with_capacity(data.len());

    for row in 0..height as usize {
        let row_data = &data[row * row_bytes..(row + 1) * row_bytes];
        for pixel in row_data.chunks_exact(4).rev() {
            mirrored.extend_from_slice(pixel);
        }
    }

    mirrored
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn solid_frame(width: u32, height: u32, rgba: [u8; 4]) -> CameraFrame {
        let data: Vec<u8> = std::iter::repeat(rgba)
            .take((width * height) as usize)
            .flatten()
            .collect();

        CameraFrame {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_convert_rgba_to_rgb() {
        let rgba = [10u8, 20, 30, 255, 40, 50, 60, 255];
        let rgb = convert_rgba_to_rgb(&rgba, 2, 1).unwrap();
        assert_eq!(rgb.as_raw(), &vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_convert_rgba_to_rgb_too_small() {
        let rgba = [10u8, 20, 30];
        assert!(convert_rgba_to_rgb(&rgba, 2, 1).is_err());
    }

    #[test]
    fn test_brightness_black_and_white() {
        let black = solid_frame(64, 64, [0, 0, 0, 255]);
        let white = solid_frame(64, 64, [255, 255, 255, 255]);

        assert!(estimate_scene_brightness(&black) < 0.01);
        assert!(estimate_scene_brightness(&white) > 0.99);
    }

    #[test]
    fn test_brightness_empty_frame() {
        let frame = CameraFrame {
            width: 0,
            height: 0,
            data: Arc::from(Vec::new().into_boxed_slice()),
            captured_at: Instant::now(),
        };
        assert_eq!(estimate_scene_brightness(&frame), 0.0);
    }

    #[test]
    fn test_mirror_rgba() {
        // Two pixels: red then blue -> blue then red
        let data = [255u8, 0, 0, 255, 0, 0, 255, 255];
        let mirrored = mirror_rgba(&data, 2, 1);
        assert_eq!(mirrored, vec![0, 0, 255, 255, 255, 0, 0, 255]);
    }

    #[test]
    fn test_mirror_rgba_twice_is_identity() {
        let frame = solid_frame(4, 2, [1, 2, 3, 4]);
        let once = mirror_rgba(&frame.data, 4, 2);
        let twice = mirror_rgba(&once, 4, 2);
        assert_eq!(&twice[..], &frame.data[..]);
    }
}
