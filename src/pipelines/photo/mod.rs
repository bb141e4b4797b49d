// SPDX-License-Identifier: GPL-3.0-only

//! Async photo capture pipeline
//!
//! This pipeline implements a fully asynchronous photo capture workflow:
//!
//! ```text
//! Preview frame → Post-Processing → Encoding → Disk I/O
//!       ↓
//! Preview continues uninterrupted
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Post-Processing**: RGBA to RGB conversion (async)
//! 2. **Encoding**: Convert to JPEG (async)
//! 3. **Disk I/O**: Save to the album with a timestamped name (async)
//!
//! Frames are passed by `Arc` so capturing never copies or pauses the
//! preview stream.

pub mod encoding;
pub mod processing;

pub use encoding::{EncodingQuality, PhotoEncoder};
pub use processing::PostProcessor;

use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use std::path::PathBuf;
use std::sync::Arc;

/// Complete photo capture pipeline
///
/// Orchestrates the process → encode → save workflow.
pub struct PhotoPipeline {
    post_processor: PostProcessor,
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    /// Create a new photo pipeline with default settings (JPEG, high quality)
    pub fn new() -> Self {
        Self {
            post_processor: PostProcessor::new(),
            encoder: PhotoEncoder::new(),
        }
    }

    /// Create a pipeline with a specific encoding quality
    pub fn with_quality(quality: EncodingQuality) -> Self {
        let mut encoder = PhotoEncoder::new();
        encoder.set_quality(quality);

        Self {
            post_processor: PostProcessor::new(),
            encoder,
        }
    }

    /// Capture and save a photo asynchronously
    ///
    /// # Arguments
    /// * `frame` - Raw camera frame (RGBA format)
    /// * `output_dir` - Directory to save the photo
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Path to saved photo
    /// * `Err(PhotoError)` - Which stage failed and why
    pub async fn capture_and_save(
        &self,
        frame: Arc<CameraFrame>,
        output_dir: PathBuf,
    ) -> Result<PathBuf, PhotoError> {
        // Stage 1: Post-process (async, CPU-bound)
        let processed = self.post_processor.process(frame).await?;

        // Stage 2: Encode (async, CPU-bound)
        let encoded = self.encoder.encode(processed).await?;

        // Stage 3: Save to disk (async, I/O-bound)
        let output_path = self.encoder.save(encoded, output_dir).await?;

        Ok(output_path)
    }
}

impl Default for PhotoPipeline {
    fn default() -> Self {
        Self::new()
    }
}
