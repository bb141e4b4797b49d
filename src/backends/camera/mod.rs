// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend (PipeWire)
//!
//! PipeWire owns device access, format negotiation and sharing between
//! consumers; this module discovers cameras and their formats and creates
//! the GStreamer preview pipeline on top of `pipewiresrc`.

pub mod pipewire;
pub mod types;

pub use types::*;

/// Enumerate available cameras
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    pipewire::enumerate_pipewire_cameras().unwrap_or_default()
}

/// Get supported formats for a specific camera device
pub fn get_formats(device: &CameraDevice) -> Vec<CameraFormat> {
    pipewire::get_pipewire_formats(&device.path, device.metadata_path.as_deref())
}

/// Check if the PipeWire backend is available on this system
pub fn is_available() -> bool {
    pipewire::is_pipewire_available()
}
