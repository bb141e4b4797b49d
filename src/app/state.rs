// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::camera::types::{CameraDevice, CameraFormat, CameraFrame};
use crate::config::Config;
use crate::flash::FlashHardware;
use cosmic::cosmic_config;
use cosmic::widget::about::About;
use std::sync::Arc;
use std::time::Instant;

/// Camera permission gate.
///
/// Until the portal answers, the UI shows a placeholder instead of the
/// preview. Denied keeps the placeholder for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionState {
    /// Waiting for the portal's answer
    #[default]
    Requesting,
    /// Access granted, preview may bind
    Granted,
    /// Access denied, placeholder stays
    Denied,
}

/// A transient on-screen notice (capture result, permission denial, ...)
///
/// The id ties the auto-dismiss timer to the notice it was started for, so
/// an old timer cannot clear a newer notice.
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub id: u64,
}

/// The application model stores app-specific state used to describe its
/// interface and drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    /// The about page for this app.
    pub about: About,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Configuration handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,
    /// Camera permission state
    pub permission: PermissionState,
    /// Torch (continuous light) currently on
    pub torch_on: bool,
    /// Flash is currently firing (white overlay + LEDs before the shutter)
    pub flash_active: bool,
    /// Capture button press animation active
    pub is_capturing: bool,
    /// A capture task is running; blocks further taps until it finishes
    pub capture_in_flight: bool,
    /// Transient notice shown over the preview
    pub notice: Option<Notice>,
    /// Sequence counter for notice auto-dismiss timers
    pub notice_seq: u64,
    /// Latest gallery thumbnail (cached)
    pub gallery_thumbnail: Option<cosmic::widget::image::Handle>,
    /// Flash/torch LED hardware discovered at startup
    pub flash_hardware: FlashHardware,
    /// Flag to cancel the camera subscription (used when switching cameras)
    pub camera_cancel_flag: Arc<std::sync::atomic::AtomicBool>,
    /// Current camera frame (capture source)
    pub current_frame: Option<Arc<CameraFrame>>,
    /// Current frame rendered for the preview widget
    pub preview_handle: Option<cosmic::widget::image::Handle>,
    /// Available camera devices
    pub available_cameras: Vec<CameraDevice>,
    /// Current camera index
    pub current_camera_index: usize,
    /// Available formats for current camera
    pub available_formats: Vec<CameraFormat>,
    /// Currently active format being used by camera
    pub active_format: Option<CameraFormat>,
    /// Dropdown options (cached for UI)
    pub camera_dropdown_options: Vec<String>,
    pub theme_dropdown_options: Vec<String>,
    /// Transition state for camera changes
    pub transition_state: TransitionState,
}

/// Pick the camera a switch tap should move to.
///
/// When the current camera reports a facing and another camera has the
/// opposite facing, jump straight to it (two taps return to the original
/// camera). Otherwise cycle through the device list.
pub fn next_camera_index(cameras: &[CameraDevice], current: usize) -> usize {
    if cameras.len() < 2 {
        return current.min(cameras.len().saturating_sub(1));
    }

    if let Some(device) = cameras.get(current)
        && let Some(opposite) = device.location.opposite()
        && let Some(index) = cameras.iter().position(|c| c.location == opposite)
    {
        return index;
    }

    (current + 1) % cameras.len()
}

/// State for dimming the preview while the camera restarts
#[derive(Debug, Clone, Default)]
pub struct TransitionState {
    /// Whether we're currently in a transition (dim is active)
    pub in_transition: bool,
    /// Timestamp when transition started
    pub transition_start_time: Option<Instant>,
    /// Timestamp when first new frame arrived (for the dim countdown)
    pub first_frame_time: Option<Instant>,
    /// Whether UI should be disabled during transition
    pub ui_disabled: bool,
}

impl TransitionState {
    /// Start a transition - dim the preview and disable the UI
    pub fn start(&mut self) {
        self.in_transition = true;
        self.ui_disabled = true;
        self.transition_start_time = Some(Instant::now());
        self.first_frame_time = None;
    }

    /// Called when a new frame arrives during transition.
    /// Returns a task to clear the dim shortly after the first frame.
    pub fn on_frame_received(&mut self) -> Option<cosmic::Task<Message>> {
        if !self.in_transition {
            return None;
        }

        if self.first_frame_time.is_none() {
            self.first_frame_time = Some(Instant::now());

            return Some(cosmic::Task::perform(
                async {
                    tokio::time::sleep(std::time::Duration::from_millis(1000)).await;
                },
                |_| Message::ClearTransitionBlur,
            ));
        }

        None
    }

    /// Check if the dim overlay should still be active
    pub fn should_blur(&self) -> bool {
        if !self.in_transition {
            return false;
        }

        // No frame yet: keep dimming the stale frame
        let Some(first_frame_time) = self.first_frame_time else {
            return true;
        };

        first_frame_time.elapsed() < std::time::Duration::from_millis(1000)
    }

    /// Clear the dim and end the transition
    pub fn clear(&mut self) {
        self.in_transition = false;
        self.ui_disabled = false;
        self.transition_start_time = None;
        self.first_frame_time = None;
    }
}

/// The context page to display in the context drawer.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
    Settings,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open external URL (repository, etc.)
    LaunchUrl(String),
    /// Toggle context drawer page (About, Settings)
    ToggleContextPage(ContextPage),

    // ===== Permission =====
    /// Portal answered the camera access request
    PermissionResolved(Result<bool, String>),

    // ===== Camera Control =====
    /// Switch to the opposite-facing (or next) camera
    SwitchCamera,
    /// Select specific camera by index
    SelectCamera(usize),
    /// New camera frame received from pipeline
    CameraFrame(Arc<CameraFrame>),
    /// Cameras enumerated after permission was granted
    CamerasInitialized(Vec<CameraDevice>, usize, Vec<CameraFormat>),
    /// Camera list changed (hotplug event)
    CameraListChanged(Vec<CameraDevice>),
    /// Clear dim overlay after a camera change settles
    ClearTransitionBlur,
    /// Toggle mirror preview (horizontal flip)
    ToggleMirrorPreview,

    // ===== Capture Operations =====
    /// Capture photo
    Capture,
    /// Cycle per-shot flash mode (Off -> On -> Auto)
    CycleFlashMode,
    /// Toggle the torch light
    ToggleTorch,
    /// Flash lead time complete, now capture the photo
    FlashComplete,
    /// Photo was saved (path) or failed (error text)
    PhotoSaved(Result<String, String>),
    /// Clear capture animation after brief delay
    ClearCaptureAnimation,

    // ===== Gallery =====
    /// Open the album in the file manager
    OpenGallery,
    /// Refresh the gallery thumbnail
    RefreshGalleryThumbnail,
    /// Gallery thumbnail loaded
    GalleryThumbnailLoaded(Option<cosmic::widget::image::Handle>),

    // ===== Settings & Notices =====
    /// Configuration updated
    UpdateConfig(Config),
    /// Select app theme by dropdown index
    SetAppTheme(usize),
    /// Auto-dismiss the notice with this id
    DismissNotice(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::CameraLocation;

    fn camera(name: &str, location: CameraLocation) -> CameraDevice {
        CameraDevice {
            name: name.to_string(),
            path: format!("pipewire-{}", name),
            metadata_path: None,
            device_info: None,
            location,
        }
    }

    #[test]
    fn test_switch_toggles_facing() {
        let cameras = vec![
            camera("back", CameraLocation::Back),
            camera("ir", CameraLocation::Unknown),
            camera("front", CameraLocation::Front),
        ];

        let first = next_camera_index(&cameras, 0);
        assert_eq!(first, 2, "back camera switches straight to front");

        let second = next_camera_index(&cameras, first);
        assert_eq!(second, 0, "switching twice returns to the original facing");
    }

    #[test]
    fn test_switch_cycles_without_facing_metadata() {
        let cameras = vec![
            camera("a", CameraLocation::Unknown),
            camera("b", CameraLocation::Unknown),
            camera("c", CameraLocation::Unknown),
        ];

        assert_eq!(next_camera_index(&cameras, 0), 1);
        assert_eq!(next_camera_index(&cameras, 1), 2);
        assert_eq!(next_camera_index(&cameras, 2), 0);
    }

    #[test]
    fn test_switch_two_unknown_cameras_is_a_toggle() {
        let cameras = vec![
            camera("a", CameraLocation::Unknown),
            camera("b", CameraLocation::Unknown),
        ];

        let once = next_camera_index(&cameras, 0);
        assert_eq!(next_camera_index(&cameras, once), 0);
    }

    #[test]
    fn test_switch_single_camera_stays_put() {
        let cameras = vec![camera("only", CameraLocation::Unknown)];
        assert_eq!(next_camera_index(&cameras, 0), 0);
    }

    #[test]
    fn test_switch_empty_list() {
        assert_eq!(next_camera_index(&[], 0), 0);
    }
}
