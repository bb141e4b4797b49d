// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire GStreamer pipeline for camera preview capture
//!
//! Builds a `pipewiresrc` pipeline that always delivers tightly packed RGBA
//! frames to an appsink. MJPEG sources are decoded with whichever JPEG
//! decoder is available; everything else goes through videoconvert.

use super::super::types::{BackendResult, CameraDevice, CameraFormat, CameraFrame, FrameSender};
use crate::constants::{pipeline, timing};
use crate::errors::CameraError;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Maximum retries for pipeline creation (handles PipeWire race conditions)
const PIPELINE_CREATE_RETRIES: u32 = 5;
/// Delay between retries in milliseconds (needs to be long enough for camera switch)
const PIPELINE_RETRY_DELAY_MS: u64 = 500;

/// JPEG decoders to try, in order of preference
const MJPEG_DECODERS: &[&str] = &["jpegdec", "avdec_mjpeg"];

/// PipeWire camera pipeline
///
/// Native GStreamer pipeline implementation using pipewiresrc for camera
/// capture. Frames are forwarded to the app through a bounded channel;
/// old frames are dropped when the consumer is slow.
pub struct PipeWirePipeline {
    pipeline: gstreamer::Pipeline,
    _appsink: AppSink,
}

impl PipeWirePipeline {
    /// Create a new PipeWire pipeline and start it
    pub fn new(
        device: &CameraDevice,
        format: &CameraFormat,
        frame_sender: FrameSender,
    ) -> BackendResult<Self> {
        info!(
            device = %device.name,
            format = %format,
            "Creating PipeWire pipeline"
        );

        gstreamer::init().map_err(|e| CameraError::InitializationFailed(e.to_string()))?;

        let device_path = if device.path.is_empty() {
            None
        } else {
            Some(device.path.as_str())
        };

        // Build caps string for resolution and framerate
        let caps_filter = match format.framerate {
            Some(fps) => format!(
                "width=(int){},height=(int){},framerate=(fraction){}",
                format.width,
                format.height,
                fps.as_gst_fraction()
            ),
            None => format!("width=(int){},height=(int){}", format.width, format.height),
        };

        info!(?device_path, caps_filter, "Initializing PipeWire camera");

        let pw_path_prop = determine_pipewire_path(device_path);
        let pipeline_str =
            build_pipeline_string(&pw_path_prop, &caps_filter, &format.pixel_format);

        // Try launching with retries to handle PipeWire race conditions
        let mut pipeline = None;
        let mut last_error = None;
        for attempt in 1..=PIPELINE_CREATE_RETRIES {
            match try_launch_pipeline_with_bus_errors(&pipeline_str) {
                Ok(p) => {
                    pipeline = Some(p);
                    break;
                }
                Err(e) => {
                    if attempt < PIPELINE_CREATE_RETRIES {
                        warn!(
                            attempt,
                            max_attempts = PIPELINE_CREATE_RETRIES,
                            error = %e,
                            "Pipeline launch failed, retrying after {}ms",
                            PIPELINE_RETRY_DELAY_MS
                        );
                        std::thread::sleep(std::time::Duration::from_millis(
                            PIPELINE_RETRY_DELAY_MS,
                        ));
                    }
                    last_error = Some(e);
                }
            }
        }

        let pipeline = pipeline.ok_or_else(|| {
            CameraError::InitializationFailed(
                last_error.unwrap_or_else(|| "Pipeline creation failed".to_string()),
            )
        })?;

        // Get the appsink element
        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| CameraError::InitializationFailed("Failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| CameraError::InitializationFailed("Failed to cast appsink".to_string()))?;

        // Configure appsink for low latency preview
        appsink.set_property("emit-signals", true);
        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true); // Drop old frames if processing is slow
        appsink.set_property("enable-last-sample", false);

        // Set up callback for new samples
        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let frame_start = Instant::now();
                    let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

                    let sample = appsink.pull_sample().map_err(|e| {
                        if frame_num % 30 == 0 {
                            error!(frame = frame_num, error = ?e, "Failed to pull sample");
                        }
                        gstreamer::FlowError::Eos
                    })?;

                    let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;

                    // Incomplete DMA transfers show up as corrupted buffers
                    if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
                        if frame_num % 30 == 0 {
                            warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
                        }
                        return Err(gstreamer::FlowError::Error);
                    }

                    let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
                    let video_info =
                        VideoInfo::from_caps(caps).map_err(|_| gstreamer::FlowError::Error)?;

                    let map = buffer
                        .map_readable()
                        .map_err(|_| gstreamer::FlowError::Error)?;

                    let width = video_info.width();
                    let height = video_info.height();
                    let stride = video_info.stride()[0] as usize;
                    let row_bytes = width as usize * 4;

                    // Compact away stride padding so downstream consumers can
                    // assume tightly packed RGBA
                    let data: Arc<[u8]> = if stride == row_bytes {
                        Arc::from(map.as_slice())
                    } else {
                        let mut packed = Vec::with_capacity(row_bytes * height as usize);
                        for row in 0..height as usize {
                            let start = row * stride;
                            packed.extend_from_slice(&map.as_slice()[start..start + row_bytes]);
                        }
                        Arc::from(packed.into_boxed_slice())
                    };

                    let frame = CameraFrame {
                        width,
                        height,
                        data,
                        captured_at: frame_start,
                    };

                    // Non-blocking send; dropping frames is fine for live preview
                    let mut sender = frame_sender.clone();
                    if let Err(e) = sender.try_send(frame) {
                        if frame_num % 30 == 0 {
                            debug!(frame = frame_num, error = ?e, "Frame dropped (channel full)");
                        }
                    } else if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                        debug!(
                            frame = frame_num,
                            width,
                            height,
                            total_us = frame_start.elapsed().as_micros(),
                            "Frame forwarded"
                        );
                    }

                    Ok(gstreamer::FlowSuccess::Ok)
                })
                .build(),
        );

        // Wait for state change to complete
        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(?result, ?state, ?pending, "Pipeline state");
        if state != gstreamer::State::Playing {
            warn!("Pipeline is not in PLAYING state yet");
        }

        info!("PipeWire camera initialization complete");

        Ok(Self {
            pipeline,
            _appsink: appsink,
        })
    }

    /// Stop the pipeline and release the camera
    pub fn stop(self) -> BackendResult<()> {
        info!("Stopping PipeWire pipeline");

        // Clear appsink callbacks to release all references
        self._appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        self.pipeline
            .set_state(gstreamer::State::Null)
            .map_err(|e| CameraError::BackendError(format!("Failed to stop pipeline: {}", e)))?;

        // Wait for state change to complete
        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        match result {
            Ok(_) => {
                info!(?state, "PipeWire pipeline stopped successfully");
            }
            Err(e) => {
                debug!(error = ?e, ?state, "Pipeline state change had issues");
            }
        }

        Ok(())
    }
}

impl Drop for PipeWirePipeline {
    fn drop(&mut self) {
        // Clear callbacks first, then release the device immediately
        self._appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        let _ = self.pipeline.set_state(gstreamer::State::Null);
        info!("PipeWire pipeline stopped");
    }
}

/// Determine PipeWire path property from device path
fn determine_pipewire_path(device_path: Option<&str>) -> String {
    match device_path {
        None | Some("") => {
            info!("Using default PipeWire camera (auto-select)");
            String::new()
        }
        Some(dev_path) if dev_path.starts_with("pipewire-serial-") => {
            let serial = dev_path
                .strip_prefix("pipewire-serial-")
                .unwrap_or(dev_path);
            info!(serial, "Using PipeWire object.serial");
            format!("target-object={} ", serial)
        }
        Some(dev_path) if dev_path.starts_with("pipewire-") => {
            let node_id = dev_path.strip_prefix("pipewire-").unwrap_or(dev_path);
            info!(node_id, "Using PipeWire node ID");
            format!("target-object={} ", node_id)
        }
        Some(dev_path) if dev_path.starts_with("/dev/video") => {
            // V4L2 device exposed through PipeWire
            info!(dev_path, "Using V4L2 device via PipeWire");
            format!("path=v4l2:{} ", dev_path)
        }
        Some(dev_path) => {
            warn!(dev_path, "Unknown device path format, using path property");
            format!("path={} ", dev_path)
        }
    }
}

/// Map a camera FourCC to the GStreamer video/x-raw format name
fn fourcc_to_gst_format(fourcc: &str) -> Option<&'static str> {
    match fourcc {
        "YUYV" | "YUY2" => Some("YUY2"),
        "UYVY" => Some("UYVY"),
        "YVYU" => Some("YVYU"),
        "NV12" => Some("NV12"),
        "NV21" => Some("NV21"),
        "I420" | "YV12" => Some("I420"),
        "GREY" | "GRAY8" | "Y8" => Some("GRAY8"),
        "RGB" => Some("RGB"),
        "BGR" => Some("BGR"),
        "RGBA" => Some("RGBA"),
        "BGRA" => Some("BGRA"),
        _ => None,
    }
}

/// Build the pipeline string for the requested source format.
///
/// Every branch ends in `video/x-raw,format=RGBA ! appsink` so the rest of
/// the app never sees another pixel format.
fn build_pipeline_string(pw_path_prop: &str, caps_filter: &str, pixel_format: &str) -> String {
    let threads = pipeline::videoconvert_threads();

    match pixel_format {
        "MJPG" | "MJPEG" => {
            let decoder = find_available_decoder(MJPEG_DECODERS);
            info!(decoder = %decoder, "MJPEG pipeline");
            format!(
                "pipewiresrc {}do-timestamp=true ! \
                 queue max-size-buffers=2 leaky=downstream ! \
                 image/jpeg,{} ! \
                 jpegparse ! \
                 {} ! \
                 videoconvert n-threads={} ! \
                 video/x-raw,format=RGBA ! \
                 queue max-size-buffers={} leaky=downstream ! \
                 appsink name=sink",
                pw_path_prop,
                caps_filter,
                decoder,
                threads,
                pipeline::MAX_BUFFERS
            )
        }
        fourcc => match fourcc_to_gst_format(fourcc) {
            Some(gst_fmt) => {
                info!(format = fourcc, gst_format = gst_fmt, "Raw format pipeline");
                format!(
                    "pipewiresrc {}do-timestamp=true ! \
                     video/x-raw,format={},{} ! \
                     videoconvert n-threads={} ! \
                     video/x-raw,format=RGBA ! \
                     appsink name=sink",
                    pw_path_prop, gst_fmt, caps_filter, threads
                )
            }
            None => {
                // Unknown format - let GStreamer negotiate and decode
                info!(format = fourcc, "Unknown format: using decodebin");
                format!(
                    "pipewiresrc {}do-timestamp=true ! decodebin ! \
                     videoconvert n-threads={} ! video/x-raw,format=RGBA ! appsink name=sink",
                    pw_path_prop, threads
                )
            }
        },
    }
}

/// Pick the first decoder element that exists in the GStreamer registry
fn find_available_decoder(candidates: &[&str]) -> String {
    for name in candidates {
        if gstreamer::ElementFactory::find(name).is_some() {
            return (*name).to_string();
        }
    }
    // jpegdec ships with gst-plugins-good; if even that is missing the
    // pipeline launch will produce a proper bus error
    candidates.first().copied().unwrap_or("jpegdec").to_string()
}

/// Try to launch pipeline and check bus for detailed error messages
fn try_launch_pipeline_with_bus_errors(
    pipeline_str: &str,
) -> Result<gstreamer::Pipeline, String> {
    info!(pipeline = %pipeline_str, "Attempting to launch pipeline");

    let parsed = gstreamer::parse::launch(pipeline_str)
        .map_err(|e| format!("Failed to parse pipeline: {}", e))?;

    let pipeline = parsed
        .dynamic_cast::<gstreamer::Pipeline>()
        .map_err(|_| "Failed to cast to pipeline".to_string())?;

    match pipeline.set_state(gstreamer::State::Playing) {
        Ok(_) => {
            let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_mseconds(
                timing::STATE_CHANGE_TIMEOUT_MS,
            ));

            if result.is_ok() && state == gstreamer::State::Playing {
                info!(?state, "Pipeline reached target state successfully");
                Ok(pipeline)
            } else if matches!(result, Ok(gstreamer::StateChangeSuccess::Async))
                && pending == gstreamer::State::Playing
            {
                // Accept asynchronous transitions for fast startup; frames
                // arrive once the device is ready
                info!(?state, ?pending, "Pipeline transitioning asynchronously");
                Ok(pipeline)
            } else {
                error!(?state, ?result, ?pending, "Pipeline failed to reach PLAYING");
                check_bus_for_errors(&pipeline);
                let _ = pipeline.set_state(gstreamer::State::Null);
                // Wait for Null so GStreamer releases all buffers
                let _ = pipeline.state(gstreamer::ClockTime::from_seconds(2));
                Err(format!(
                    "Pipeline failed to start (state: {:?}, result: {:?})",
                    state, result
                ))
            }
        }
        Err(e) => {
            error!(error = %e, "Failed to set pipeline to PLAYING state");
            check_bus_for_errors(&pipeline);
            let _ = pipeline.set_state(gstreamer::State::Null);
            let _ = pipeline.state(gstreamer::ClockTime::from_seconds(2));
            Err(format!("Failed to set pipeline to PLAYING: {}", e))
        }
    }
}

/// Check bus for error messages
fn check_bus_for_errors(pipeline: &gstreamer::Pipeline) {
    if let Some(bus) = pipeline.bus()
        && let Some(msg) = bus.timed_pop_filtered(
            gstreamer::ClockTime::from_mseconds(100),
            &[
                gstreamer::MessageType::Error,
                gstreamer::MessageType::Warning,
            ],
        )
    {
        match msg.view() {
            gstreamer::MessageView::Error(err) => {
                error!(
                    error = %err.error(),
                    debug = ?err.debug(),
                    source = ?err.src().map(|s| s.name()),
                    "GStreamer ERROR during pipeline start"
                );
            }
            gstreamer::MessageView::Warning(warn_msg) => {
                warn!(
                    warning = %warn_msg.error(),
                    debug = ?warn_msg.debug(),
                    "GStreamer WARNING during pipeline start"
                );
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_pipewire_path() {
        assert_eq!(determine_pipewire_path(None), "");
        assert_eq!(determine_pipewire_path(Some("")), "");
        assert_eq!(
            determine_pipewire_path(Some("pipewire-serial-2146")),
            "target-object=2146 "
        );
        assert_eq!(
            determine_pipewire_path(Some("pipewire-76")),
            "target-object=76 "
        );
        assert_eq!(
            determine_pipewire_path(Some("/dev/video0")),
            "path=v4l2:/dev/video0 "
        );
    }

    #[test]
    fn test_build_pipeline_string_always_outputs_rgba() {
        // find_available_decoder queries the element registry
        gstreamer::init().expect("GStreamer init failed");

        for fourcc in ["MJPG", "YUYV", "NV12", "SOMETHING_ODD"] {
            let s = build_pipeline_string("", "width=(int)640,height=(int)480", fourcc);
            assert!(s.contains("format=RGBA"), "{} pipeline missing RGBA: {}", fourcc, s);
            assert!(s.ends_with("appsink name=sink"));
        }
    }

    #[test]
    fn test_fourcc_mapping() {
        assert_eq!(fourcc_to_gst_format("YUYV"), Some("YUY2"));
        assert_eq!(fourcc_to_gst_format("MJPG"), None);
    }
}
