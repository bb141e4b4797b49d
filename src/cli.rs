// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking photos headlessly

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use viewfinder::backends::camera::pipewire::{
    PipeWirePipeline, enumerate_pipewire_cameras, get_pipewire_formats,
    select_max_resolution_format,
};
use viewfinder::backends::camera::types::CameraFrame;
use viewfinder::errors::{AppError, AppResult, CameraError, PhotoError};
use viewfinder::pipelines::photo::PhotoPipeline;

/// List all available cameras
pub fn list_cameras() -> AppResult<()> {
    gstreamer::init().map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

    if !viewfinder::backends::camera::is_available() {
        return Err(CameraError::BackendError("PipeWire is not available".to_string()).into());
    }

    let cameras = enumerate_pipewire_cameras().unwrap_or_default();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);

        // Get formats for this camera
        let formats = get_pipewire_formats(&camera.path, camera.metadata_path.as_deref());
        if !formats.is_empty() {
            // Group formats by resolution and show best framerate
            let mut resolutions: Vec<(u32, u32, u32)> = Vec::new();
            for format in &formats {
                let fps = format.framerate.map(|f| f.as_int()).unwrap_or(30);
                if let Some(existing) = resolutions
                    .iter_mut()
                    .find(|(w, h, _)| *w == format.width && *h == format.height)
                {
                    if fps > existing.2 {
                        existing.2 = fps;
                    }
                } else {
                    resolutions.push((format.width, format.height, fps));
                }
            }

            // Sort by resolution (highest first)
            resolutions.sort_by(|a, b| (b.0 * b.1).cmp(&(a.0 * a.1)));

            // Show top 3 resolutions
            let res_strs: Vec<String> = resolutions
                .iter()
                .take(3)
                .map(|(w, h, fps)| format!("{}x{}@{}fps", w, h, fps))
                .collect();

            println!("      Formats: {}", res_strs.join(", "));
        }
        println!();
    }

    Ok(())
}

/// Take a photo using the specified camera
pub fn take_photo(camera_index: usize, output: Option<PathBuf>) -> AppResult<()> {
    gstreamer::init().map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

    // Enumerate cameras
    let cameras = enumerate_pipewire_cameras().unwrap_or_default();
    if cameras.is_empty() {
        return Err(CameraError::NoCameraFound.into());
    }

    if camera_index >= cameras.len() {
        return Err(AppError::Other(format!(
            "Camera index {} out of range (0-{})",
            camera_index,
            cameras.len() - 1
        )));
    }

    let camera = &cameras[camera_index];
    println!("Using camera: {}", camera.name);

    // Get formats and select best one for photos (highest resolution)
    let formats = get_pipewire_formats(&camera.path, camera.metadata_path.as_deref());
    let format = select_max_resolution_format(&formats).ok_or_else(|| {
        AppError::Camera(CameraError::InvalidFormat(
            "No formats available for camera".to_string(),
        ))
    })?;
    println!("Capture format: {}x{}", format.width, format.height);

    // Determine output directory
    let output_dir = if let Some(path) = output.as_ref() {
        if path.is_dir() {
            path.clone()
        } else {
            path.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(viewfinder::storage::photo_directory)
        }
    } else {
        viewfinder::storage::photo_directory()
    };

    // Ensure output directory exists
    std::fs::create_dir_all(&output_dir)?;

    // Start camera pipeline
    println!("Capturing...");
    let (sender, mut receiver) = futures::channel::mpsc::channel(10);
    let _pipeline = PipeWirePipeline::new(camera, &format, sender)?;

    // Wait for frames to stabilize (camera warm-up)
    let start = Instant::now();
    let timeout = Duration::from_secs(5);
    let warmup = Duration::from_millis(500);
    let mut frame: Option<CameraFrame> = None;

    while start.elapsed() < timeout {
        match receiver.try_next() {
            Ok(Some(f)) => {
                frame = Some(f);
                // After warmup period, use the next good frame
                if start.elapsed() > warmup {
                    break;
                }
            }
            Ok(None) => break, // pipeline closed the channel
            Err(_) => {
                // No frame available yet, wait a bit
                std::thread::sleep(Duration::from_millis(16));
            }
        }
    }

    let frame = frame.ok_or(AppError::Photo(PhotoError::NoFrameAvailable))?;

    // Use photo pipeline to save the image
    let photo_pipeline = PhotoPipeline::new();

    // Create async runtime for the pipeline
    let rt = tokio::runtime::Runtime::new()?;
    let output_path = rt.block_on(async {
        photo_pipeline
            .capture_and_save(Arc::new(frame), output_dir)
            .await
    })?;

    // If user specified a specific filename, rename the file
    if let Some(user_path) = output
        && !user_path.is_dir()
    {
        std::fs::rename(&output_path, &user_path)?;
        println!("Photo saved: {}", user_path.display());
        return Ok(());
    }

    println!("Photo saved: {}", output_path.display());
    Ok(())
}
