// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the camera backend

use crate::errors::CameraError;
use std::sync::Arc;
use std::time::Instant;

/// Physical mounting location of a camera, as reported by libcamera
/// properties through PipeWire. Desktop webcams usually report nothing
/// and show up as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraLocation {
    /// User-facing camera (selfie side)
    Front,
    /// World-facing camera
    Back,
    /// External camera (USB webcam plugged into a mobile device)
    External,
    /// Location not reported
    #[default]
    Unknown,
}

impl CameraLocation {
    /// Parse the `api.libcamera.location` property value
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "front" => CameraLocation::Front,
            "back" => CameraLocation::Back,
            "external" => CameraLocation::External,
            _ => CameraLocation::Unknown,
        }
    }

    /// The facing a switch should move to, if this location has one
    pub fn opposite(&self) -> Option<CameraLocation> {
        match self {
            CameraLocation::Front => Some(CameraLocation::Back),
            CameraLocation::Back => Some(CameraLocation::Front),
            _ => None,
        }
    }
}

/// Device information from V4L2 capability
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    /// Name of the device (V4L2 card)
    pub card: String,
    /// Driver name (V4L2 driver)
    pub driver: String,
    /// Device path (e.g., /dev/video0)
    pub path: String,
    /// Real device path (resolved symlinks)
    pub real_path: String,
}

/// Represents a camera device
#[derive(Debug, Clone)]
pub struct CameraDevice {
    pub name: String,
    /// Path to capture device (PipeWire node ID or serial)
    pub path: String,
    /// PipeWire node ID used for format enumeration
    pub metadata_path: Option<String>,
    /// V4L2 device information (card, driver, path, real_path)
    pub device_info: Option<DeviceInfo>,
    /// Camera mounting location (front/back/external)
    pub location: CameraLocation,
}

/// Framerate as a fraction (numerator/denominator)
/// Stores exact framerate to handle NTSC rates like 59.94fps (60000/1001)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Framerate {
    pub num: u32,
    pub denom: u32,
}

impl Framerate {
    /// Create a new framerate from numerator and denominator
    pub fn new(num: u32, denom: u32) -> Self {
        Self {
            num,
            denom: if denom == 0 { 1 } else { denom },
        }
    }

    /// Create a framerate from an integer (e.g., 30 becomes 30/1)
    pub fn from_int(fps: u32) -> Self {
        Self { num: fps, denom: 1 }
    }

    /// Get the framerate as a floating point value
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.denom as f64
    }

    /// Get the rounded integer framerate
    pub fn as_int(&self) -> u32 {
        self.num / self.denom
    }

    /// Format as GStreamer fraction string (e.g., "60000/1001")
    pub fn as_gst_fraction(&self) -> String {
        format!("{}/{}", self.num, self.denom)
    }
}

impl std::fmt::Display for Framerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Show decimal for non-integer framerates (NTSC)
        if self.denom != 1 {
            write!(f, "{:.2}", self.as_f64())
        } else {
            write!(f, "{}", self.num)
        }
    }
}

impl Default for Framerate {
    fn default() -> Self {
        Self { num: 30, denom: 1 }
    }
}

/// Camera format specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    /// None when the backend negotiates the rate itself (libcamera)
    pub framerate: Option<Framerate>,
    /// FourCC code of the source format (e.g., "MJPG", "YUYV")
    pub pixel_format: String,
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(fps) = &self.framerate {
            write!(f, "{}x{} @ {}fps", self.width, self.height, fps)
        } else {
            write!(f, "{}x{}", self.width, self.height)
        }
    }
}

/// A single frame from the camera.
///
/// The preview pipeline always delivers tightly packed RGBA pixels; stride
/// padding is removed at the appsink before frames enter the app.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA pixel data (width * height * 4 bytes)
    pub data: Arc<[u8]>,
    /// Timestamp when the frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

/// Frame receiver type for preview streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, CameraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framerate_display() {
        assert_eq!(Framerate::from_int(30).to_string(), "30");
        assert_eq!(Framerate::new(60000, 1001).to_string(), "59.94");
    }

    #[test]
    fn test_framerate_zero_denominator_guard() {
        let fps = Framerate::new(30, 0);
        assert_eq!(fps.denom, 1);
        assert_eq!(fps.as_int(), 30);
    }

    #[test]
    fn test_camera_location_parse() {
        assert_eq!(CameraLocation::parse("front"), CameraLocation::Front);
        assert_eq!(CameraLocation::parse("back"), CameraLocation::Back);
        assert_eq!(CameraLocation::parse("external"), CameraLocation::External);
        assert_eq!(CameraLocation::parse("sideways"), CameraLocation::Unknown);
    }

    #[test]
    fn test_camera_location_opposite() {
        assert_eq!(
            CameraLocation::Front.opposite(),
            Some(CameraLocation::Back)
        );
        assert_eq!(
            CameraLocation::Back.opposite(),
            Some(CameraLocation::Front)
        );
        assert_eq!(CameraLocation::Unknown.opposite(), None);
    }

    #[test]
    fn test_camera_format_display() {
        let format = CameraFormat {
            width: 1920,
            height: 1080,
            framerate: Some(Framerate::from_int(30)),
            pixel_format: "MJPG".to_string(),
        };
        assert_eq!(format.to_string(), "1920x1080 @ 30fps");
    }
}
