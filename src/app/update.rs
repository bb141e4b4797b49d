// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function acts as a dispatcher; the handlers live in
//! the `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::camera`: Permission, camera selection, frames, hotplug
//! - `handlers::capture`: Photo capture, flash, torch
//! - `handlers::ui`: Navigation, gallery, settings, notices

use crate::app::state::{AppModel, Message};
use cosmic::Task;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),

            // ===== Permission =====
            Message::PermissionResolved(result) => self.handle_permission_resolved(result),

            // ===== Camera Control =====
            Message::SwitchCamera => self.handle_switch_camera(),
            Message::SelectCamera(index) => self.handle_select_camera(index),
            Message::CameraFrame(frame) => self.handle_camera_frame(frame),
            Message::CamerasInitialized(cameras, index, formats) => {
                self.handle_cameras_initialized(cameras, index, formats)
            }
            Message::CameraListChanged(cameras) => self.handle_camera_list_changed(cameras),
            Message::ClearTransitionBlur => self.handle_clear_transition_blur(),
            Message::ToggleMirrorPreview => self.handle_toggle_mirror_preview(),

            // ===== Capture Operations =====
            Message::Capture => self.handle_capture(),
            Message::CycleFlashMode => self.handle_cycle_flash_mode(),
            Message::ToggleTorch => self.handle_toggle_torch(),
            Message::FlashComplete => self.handle_flash_complete(),
            Message::PhotoSaved(result) => self.handle_photo_saved(result),
            Message::ClearCaptureAnimation => self.handle_clear_capture_animation(),

            // ===== Gallery =====
            Message::OpenGallery => self.handle_open_gallery(),
            Message::RefreshGalleryThumbnail => self.handle_refresh_gallery_thumbnail(),
            Message::GalleryThumbnailLoaded(handle) => {
                self.handle_gallery_thumbnail_loaded(handle)
            }

            // ===== Settings & Notices =====
            Message::UpdateConfig(config) => self.handle_update_config(config),
            Message::SetAppTheme(index) => self.handle_set_app_theme(index),
            Message::DismissNotice(id) => self.handle_dismiss_notice(id),
        }
    }
}
