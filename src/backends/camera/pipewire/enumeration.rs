// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration and format detection
//!
//! This module provides camera discovery and format enumeration using PipeWire.
//! PipeWire handles all camera access, format negotiation, and decoding internally.

use super::super::types::{CameraDevice, CameraFormat, CameraLocation, DeviceInfo, Framerate};
use crate::constants::formats;
use tracing::{debug, info, warn};

/// Enumerate cameras using PipeWire
/// Returns list of available cameras discovered through PipeWire
pub fn enumerate_pipewire_cameras() -> Option<Vec<CameraDevice>> {
    debug!("Attempting to enumerate cameras via PipeWire");

    // Check if PipeWire is available
    if gstreamer::init().is_err() {
        warn!("GStreamer init failed");
        return None;
    }

    // Check if pipewiresrc element exists
    if gstreamer::ElementFactory::find("pipewiresrc").is_none() {
        debug!("pipewiresrc not available");
        return None;
    }

    debug!("PipeWire available for camera enumeration");

    if let Some(cameras) = try_enumerate_with_pw_cli() {
        debug!(count = cameras.len(), "Found PipeWire cameras");
        return Some(cameras);
    }

    // Fallback: Let PipeWire use its default camera
    info!("Using PipeWire auto-selection (default camera)");
    Some(vec![CameraDevice {
        name: "Default Camera (PipeWire)".to_string(),
        path: String::new(), // Empty path = PipeWire auto-selects
        metadata_path: None,
        device_info: None,
        location: CameraLocation::Unknown,
    }])
}

/// Properties collected for one node while walking `pw-cli ls Node` output
#[derive(Default)]
struct NodeProps {
    id: Option<String>,
    serial: Option<String>,
    name: Option<String>,
    nick: Option<String>,
    object_path: Option<String>,
    is_video_source: bool,
}

impl NodeProps {
    /// Convert the collected properties into a camera device, if this node
    /// turned out to be a video source
    fn into_camera(self) -> Option<CameraDevice> {
        if !self.is_video_source {
            return None;
        }
        let (id, name) = (self.id?, self.name?);

        // Priority: use object.serial for target-object, fallback to node ID
        let path = if let Some(serial) = self.serial.as_ref() {
            format!("pipewire-serial-{}", serial)
        } else {
            format!("pipewire-{}", id)
        };

        let device_info = build_device_info(self.nick.as_deref(), self.object_path.as_deref());

        // Query location from pw-cli info (not available in pw-cli ls output)
        let location = query_node_location(&id);

        debug!(id = %id, serial = ?self.serial, name = %name, path = %path, ?location, "Found video camera");
        Some(CameraDevice {
            name,
            path,
            metadata_path: Some(id), // Node ID, used for format enumeration
            device_info,
            location,
        })
    }
}

/// Try to enumerate cameras using pw-cli command
fn try_enumerate_with_pw_cli() -> Option<Vec<CameraDevice>> {
    debug!("Trying pw-cli for camera enumeration");

    let output = std::process::Command::new("pw-cli")
        .args(["ls", "Node"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("pw-cli command failed");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut cameras = Vec::new();
    let mut current = NodeProps::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        // Look for node ID (format: "id 76, type PipeWire:Interface:Node/3")
        if trimmed.starts_with("id ") && trimmed.contains("type PipeWire:Interface:Node") {
            // Save previous camera if valid
            if let Some(camera) = std::mem::take(&mut current).into_camera() {
                cameras.push(camera);
            }

            // Parse new ID (extract number between "id " and ",")
            if let Some(id_str) = trimmed.strip_prefix("id ")
                && let Some(id_num) = id_str.split(',').next()
            {
                current.id = Some(id_num.trim().trim_end_matches(',').to_string());
            }
        }

        // media.class = "Video/Source" marks camera nodes
        if trimmed.contains("media.class") && trimmed.contains("\"Video/Source\"") {
            current.is_video_source = true;
        }

        // object.serial = "2146" — for the pipewiresrc target-object property
        if trimmed.contains("object.serial")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            current.serial = Some(value);
        }

        // object.path = "v4l2:/dev/video0" — V4L2 device path
        if trimmed.contains("object.path")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            current.object_path = Some(value);
        }

        // node.nick = "Laptop Webcam Module (2nd Gen)" — card name
        if trimmed.contains("node.nick")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            current.nick = Some(value);
        }

        // node.description = "Laptop Webcam Module (2nd Gen) (V4L2)" — camera name
        if trimmed.contains("node.description")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            current.name = Some(value);
        }
    }

    // Don't forget the last camera
    if let Some(camera) = current.into_camera() {
        cameras.push(camera);
    }

    if cameras.is_empty() {
        debug!("No cameras found via pw-cli");
        None
    } else {
        debug!(count = cameras.len(), "Enumerated cameras via pw-cli");
        Some(cameras)
    }
}

/// Extract quoted value from a property line (e.g., 'property = "value"' -> "value")
fn extract_quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    Some(line[start + 1..start + 1 + end].to_string())
}

/// Query mounting location for a PipeWire node using pw-cli info
/// This is needed because pw-cli ls Node doesn't include api.libcamera.location
fn query_node_location(node_id: &str) -> CameraLocation {
    let output = match std::process::Command::new("pw-cli")
        .args(["info", node_id])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => {
            debug!(node_id, "Failed to query node info for location");
            return CameraLocation::default();
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);

    for line in stdout.lines() {
        let trimmed = line.trim();
        // Look for: api.libcamera.location = "front"
        if trimmed.contains("api.libcamera.location")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            debug!(node_id, location = %value, "Found location from pw-cli info");
            return CameraLocation::parse(&value);
        }
    }

    CameraLocation::default()
}

/// Build DeviceInfo from PipeWire properties and V4L2 device info
fn build_device_info(nick: Option<&str>, object_path: Option<&str>) -> Option<DeviceInfo> {
    // Extract V4L2 device path from object.path (format: "v4l2:/dev/video0")
    let v4l2_path = object_path.and_then(|p| p.strip_prefix("v4l2:"))?.to_string();

    // Get real path by resolving symlinks
    let real_path = std::fs::canonicalize(&v4l2_path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| v4l2_path.clone());

    // Get driver name using V4L2 ioctl
    let driver = get_v4l2_driver(&v4l2_path).unwrap_or_default();

    // Use node.nick as the card name, fallback to empty
    let card = nick.unwrap_or_default().to_string();

    Some(DeviceInfo {
        card,
        driver,
        path: v4l2_path,
        real_path,
    })
}

/// Get V4L2 driver name using ioctl
fn get_v4l2_driver(device_path: &str) -> Option<String> {
    use std::os::unix::io::AsRawFd;

    // VIDIOC_QUERYCAP ioctl number
    const VIDIOC_QUERYCAP: libc::c_ulong = 0x80685600;

    // V4L2 capability structure (simplified - we only need driver field)
    #[repr(C)]
    struct V4l2Capability {
        driver: [u8; 16],
        card: [u8; 32],
        bus_info: [u8; 32],
        version: u32,
        capabilities: u32,
        device_caps: u32,
        reserved: [u32; 3],
    }

    let file = std::fs::File::open(device_path).ok()?;
    let fd = file.as_raw_fd();

    let mut cap = V4l2Capability {
        driver: [0; 16],
        card: [0; 32],
        bus_info: [0; 32],
        version: 0,
        capabilities: 0,
        device_caps: 0,
        reserved: [0; 3],
    };

    let result = unsafe {
        libc::syscall(
            libc::SYS_ioctl,
            fd,
            VIDIOC_QUERYCAP,
            &mut cap as *mut V4l2Capability,
        )
    };

    if result < 0 {
        debug!(device_path, "Failed to query V4L2 capability");
        return None;
    }

    // Convert driver name from null-terminated bytes to String
    let driver_len = cap.driver.iter().position(|&c| c == 0).unwrap_or(16);
    let driver = String::from_utf8_lossy(&cap.driver[..driver_len]).to_string();

    debug!(device_path, driver = %driver, "Got V4L2 driver name");
    Some(driver)
}

/// Get supported formats for a PipeWire camera
/// Queries actual supported formats from PipeWire using pw-cli enum-params
pub fn get_pipewire_formats(device_path: &str, metadata_path: Option<&str>) -> Vec<CameraFormat> {
    debug!(device_path, metadata_path = ?metadata_path, "Getting PipeWire formats");

    // metadata_path contains the node ID for PipeWire cameras
    if let Some(node_id) = metadata_path {
        if let Some(formats) = try_enumerate_formats_from_node(node_id) {
            info!(count = formats.len(), node_id = %node_id, "Enumerated formats via pw-cli");
            return formats;
        } else {
            warn!(node_id = %node_id, "Failed to enumerate formats from node, using fallback");
        }
    } else {
        warn!(
            device_path,
            "No node ID provided for format enumeration, using fallback"
        );
    }

    // Fallback: return common formats if we can't query PipeWire
    get_fallback_formats()
}

/// Fallback formats when PipeWire enumeration fails
fn get_fallback_formats() -> Vec<CameraFormat> {
    let mut formats = Vec::new();
    let resolutions = [
        (1920, 1080), // 1080p
        (1280, 720),  // 720p
        (640, 480),   // VGA
    ];

    for &(width, height) in &resolutions {
        for &fps in formats::COMMON_FRAMERATES {
            formats.push(CameraFormat {
                width,
                height,
                framerate: Some(Framerate::from_int(fps)),
                pixel_format: "MJPG".to_string(),
            });
        }
    }
    formats
}

/// Try to enumerate formats from a PipeWire node using pw-cli
fn try_enumerate_formats_from_node(node_id: &str) -> Option<Vec<CameraFormat>> {
    debug!(node_id, "Enumerating formats via pw-cli enum-params");

    let output = std::process::Command::new("pw-cli")
        .args(["enum-params", node_id, "EnumFormat"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("pw-cli enum-params failed");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut formats = Vec::new();
    let mut current_width: Option<u32> = None;
    let mut current_height: Option<u32> = None;
    let mut current_framerates: Vec<Framerate> = Vec::new();
    let mut current_subtype: Option<String> = None;
    let mut current_video_format: Option<String> = None;

    // Push the format group collected so far into `formats`
    let push_group = |formats: &mut Vec<CameraFormat>,
                      width: Option<u32>,
                      height: Option<u32>,
                      subtype: &Option<String>,
                      video_format: &Option<String>,
                      framerates: &[Framerate]| {
        let (Some(w), Some(h), Some(subtype)) = (width, height, subtype.as_ref()) else {
            return;
        };

        // Raw formats carry the VideoFormat (YUY2, NV12, ...); compressed
        // formats are identified by the MediaSubtype (MJPG, H264, ...)
        let pixel_format = if subtype == "raw" {
            video_format.clone().unwrap_or_else(|| "YUY2".to_string())
        } else {
            subtype.to_uppercase()
        };

        if framerates.is_empty() {
            // libcamera doesn't expose framerates via PipeWire EnumFormat;
            // it negotiates per resolution via FrameDurationLimits
            formats.push(CameraFormat {
                width: w,
                height: h,
                framerate: None,
                pixel_format,
            });
        } else {
            for fps in framerates {
                formats.push(CameraFormat {
                    width: w,
                    height: h,
                    framerate: Some(*fps),
                    pixel_format: pixel_format.clone(),
                });
            }
        }
    };

    for line in stdout.lines() {
        let trimmed = line.trim();

        // Id 131074   (Spa:Enum:MediaSubtype:mjpg)
        if trimmed.contains("Spa:Enum:MediaSubtype:")
            && let Some(subtype_start) = trimmed.rfind(':')
        {
            let subtype = trimmed[subtype_start + 1..].trim_end_matches(')');
            current_subtype = Some(subtype.to_lowercase());
        }

        // Id 4   (Spa:Enum:VideoFormat:YUY2) — only present for raw formats
        if trimmed.contains("Spa:Enum:VideoFormat:")
            && let Some(format_start) = trimmed.rfind(':')
        {
            let video_format = trimmed[format_start + 1..].trim_end_matches(')');
            current_video_format = Some(video_format.to_uppercase());
        }

        // Rectangle 1920x1080
        if trimmed.starts_with("Rectangle ")
            && let Some(res_str) = trimmed.strip_prefix("Rectangle ")
            && let Some((w_str, h_str)) = res_str.split_once('x')
        {
            current_width = w_str.parse().ok();
            current_height = h_str.parse().ok();
        }

        // Fraction 60/1 or Fraction 60000/1001
        if trimmed.starts_with("Fraction ")
            && let Some(frac_str) = trimmed.strip_prefix("Fraction ")
            && let Some((num_str, denom_str)) = frac_str.split_once('/')
            && let (Ok(num), Ok(denom)) = (num_str.parse::<u32>(), denom_str.parse::<u32>())
            && denom > 0
        {
            let fps = Framerate::new(num, denom);
            // Deduplicate by integer fps (60000/1001 and 60/1 both ~ 60fps)
            if !current_framerates
                .iter()
                .any(|f| f.as_int() == fps.as_int())
            {
                current_framerates.push(fps);
            }
        }

        // A new Object starts a new format group
        if trimmed.starts_with("Object:") {
            push_group(
                &mut formats,
                current_width,
                current_height,
                &current_subtype,
                &current_video_format,
                &current_framerates,
            );
            current_width = None;
            current_height = None;
            current_framerates.clear();
            current_subtype = None;
            current_video_format = None;
        }
    }

    // Don't forget the last format group
    push_group(
        &mut formats,
        current_width,
        current_height,
        &current_subtype,
        &current_video_format,
        &current_framerates,
    );

    if formats.is_empty() { None } else { Some(formats) }
}

/// Select the best format for photo capture (highest resolution)
pub fn select_max_resolution_format(formats: &[CameraFormat]) -> Option<CameraFormat> {
    formats.iter().max_by_key(|f| f.width * f.height).cloned()
}

/// Test if PipeWire is available and working
pub fn is_pipewire_available() -> bool {
    if gstreamer::init().is_err() {
        return false;
    }

    gstreamer::ElementFactory::find("pipewiresrc").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_quoted_value() {
        assert_eq!(
            extract_quoted_value("object.serial = \"2146\""),
            Some("2146".to_string())
        );
        assert_eq!(extract_quoted_value("no quotes here"), None);
    }

    #[test]
    fn test_select_max_resolution_format() {
        let formats = vec![
            CameraFormat {
                width: 640,
                height: 480,
                framerate: Some(Framerate::from_int(30)),
                pixel_format: "YUYV".to_string(),
            },
            CameraFormat {
                width: 1920,
                height: 1080,
                framerate: Some(Framerate::from_int(30)),
                pixel_format: "MJPG".to_string(),
            },
        ];

        let best = select_max_resolution_format(&formats).unwrap();
        assert_eq!((best.width, best.height), (1920, 1080));
    }

    #[test]
    fn test_select_max_resolution_format_empty() {
        assert!(select_max_resolution_format(&[]).is_none());
    }

    #[test]
    fn test_fallback_formats_not_empty() {
        assert!(!get_fallback_formats().is_empty());
    }
}
