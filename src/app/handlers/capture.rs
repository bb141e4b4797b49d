// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Handles photo capture, flash mode cycling, and the torch toggle.

use crate::app::state::{AppModel, Message};
use crate::constants::{flash as flash_constants, ui};
use crate::errors::PhotoError;
use crate::fl;
use crate::flash::{self, FlashMode};
use crate::pipelines::photo::PhotoPipeline;
use crate::pipelines::photo::processing::estimate_scene_brightness;
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use std::sync::Arc;
use tracing::{error, info, warn};

impl AppModel {
    // =========================================================================
    // Capture Operations Handlers
    // =========================================================================

    /// Create a delayed task that sends a message after the specified milliseconds
    pub(crate) fn delay_task(millis: u64, message: Message) -> Task<cosmic::Action<Message>> {
        Task::perform(
            async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(millis)).await;
                message
            },
            cosmic::Action::App,
        )
    }

    /// Whether the flash should fire for the next capture
    fn flash_should_fire(&self) -> bool {
        match self.config.flash_mode {
            FlashMode::Off => false,
            FlashMode::On => true,
            FlashMode::Auto => self
                .current_frame
                .as_deref()
                .map(|frame| {
                    let brightness = estimate_scene_brightness(frame);
                    info!(brightness, "Auto flash brightness estimate");
                    brightness < flash_constants::AUTO_FLASH_LUMA_THRESHOLD
                })
                .unwrap_or(false),
        }
    }

    pub(crate) fn handle_capture(&mut self) -> Task<cosmic::Action<Message>> {
        // One file per tap: ignore taps while a capture is in flight
        if self.capture_in_flight {
            info!("Capture already in progress, ignoring tap");
            return Task::none();
        }

        if self.flash_should_fire() && !self.flash_active {
            info!("Flash firing before capture");
            self.flash_active = true;
            flash::all_on(&self.flash_hardware.devices);
            return Self::delay_task(flash_constants::FLASH_LEAD_MS, Message::FlashComplete);
        }

        self.capture_photo()
    }

    pub(crate) fn handle_flash_complete(&mut self) -> Task<cosmic::Action<Message>> {
        info!("Flash complete - capturing photo");
        self.flash_active = false;

        // capture_photo grabs the current (lit) frame synchronously, so the
        // LEDs can be restored right after
        let task = self.capture_photo();

        if !self.torch_on {
            flash::all_off(&self.flash_hardware.devices);
        }

        task
    }

    /// Capture the current frame as a photo
    pub(crate) fn capture_photo(&mut self) -> Task<cosmic::Action<Message>> {
        let Some(frame) = &self.current_frame else {
            info!("No frame available to capture");
            return self.show_notice(fl!(
                "photo-failed",
                error = PhotoError::NoFrameAvailable.to_string()
            ));
        };

        info!("Capturing photo...");
        self.is_capturing = true;
        self.capture_in_flight = true;

        let frame_arc = Arc::clone(frame);
        let save_dir = crate::storage::photo_directory();

        let save_task = Task::perform(
            async move {
                PhotoPipeline::new()
                    .capture_and_save(frame_arc, save_dir)
                    .await
                    .map(|path| path.display().to_string())
                    .map_err(|e| e.to_string())
            },
            |result| cosmic::Action::App(Message::PhotoSaved(result)),
        );

        let animation_task = Self::delay_task(ui::CAPTURE_ANIMATION_MS, Message::ClearCaptureAnimation);
        Task::batch([save_task, animation_task])
    }

    pub(crate) fn handle_photo_saved(
        &mut self,
        result: Result<String, String>,
    ) -> Task<cosmic::Action<Message>> {
        self.capture_in_flight = false;

        match result {
            Ok(path) => {
                info!(path = %path, "Photo saved successfully");
                let notice_task = self.show_notice(fl!("photo-saved", path = path));
                Task::batch([
                    notice_task,
                    Task::done(cosmic::Action::App(Message::RefreshGalleryThumbnail)),
                ])
            }
            Err(err) => {
                error!(error = %err, "Failed to save photo");
                self.show_notice(fl!("photo-failed", error = err))
            }
        }
    }

    pub(crate) fn handle_clear_capture_animation(&mut self) -> Task<cosmic::Action<Message>> {
        self.is_capturing = false;
        Task::none()
    }

    // =========================================================================
    // Flash & Torch Handlers
    // =========================================================================

    pub(crate) fn handle_cycle_flash_mode(&mut self) -> Task<cosmic::Action<Message>> {
        self.config.flash_mode = self.config.flash_mode.next();
        info!(flash_mode = ?self.config.flash_mode, "Flash mode cycled");

        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, "Failed to save flash mode");
        }

        Task::none()
    }

    pub(crate) fn handle_toggle_torch(&mut self) -> Task<cosmic::Action<Message>> {
        if !self.flash_hardware.has_devices() {
            warn!("Torch toggled without controllable flash hardware");
            let text = self
                .flash_hardware
                .permission_error
                .clone()
                .unwrap_or_else(|| fl!("torch-unavailable"));
            return self.show_notice(text);
        }

        self.torch_on = !self.torch_on;
        info!(torch_on = self.torch_on, "Torch toggled");

        if self.torch_on {
            flash::all_on(&self.flash_hardware.devices);
        } else {
            flash::all_off(&self.flash_hardware.devices);
        }

        Task::none()
    }
}
