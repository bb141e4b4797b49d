// SPDX-License-Identifier: GPL-3.0-only

//! Camera control handlers
//!
//! Handles the permission gate, camera selection and switching, frame
//! processing, initialization, and hotplug events.

use crate::app::state::{AppModel, Message, PermissionState, next_camera_index};
use crate::backends::camera::types::{CameraDevice, CameraFormat, CameraFrame};
use crate::fl;
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use std::sync::Arc;
use tracing::{error, info, warn};

impl AppModel {
    // =========================================================================
    // Permission Handlers
    // =========================================================================

    pub(crate) fn handle_permission_resolved(
        &mut self,
        result: Result<bool, String>,
    ) -> Task<cosmic::Action<Message>> {
        match result {
            Ok(true) => {
                info!("Camera permission granted - enumerating cameras");
                self.permission = PermissionState::Granted;
                self.enumerate_cameras_task(None)
            }
            Ok(false) => {
                warn!("Camera permission denied");
                self.permission = PermissionState::Denied;
                self.show_notice(fl!("permission-denied-notice"))
            }
            Err(e) => {
                error!(error = %e, "Camera permission request failed");
                self.permission = PermissionState::Denied;
                self.show_notice(fl!("permission-denied-notice"))
            }
        }
    }

    /// Enumerate cameras and their formats off the UI thread.
    ///
    /// `select_index` forces a camera choice; otherwise the last used camera
    /// from the config is restored (falling back to the first).
    fn enumerate_cameras_task(
        &self,
        select_index: Option<usize>,
    ) -> Task<cosmic::Action<Message>> {
        let last_camera_path = self.config.last_camera_path.clone();

        Task::perform(
            async move {
                // Enumeration shells out to pw-cli, which can be slow
                let cameras =
                    tokio::task::spawn_blocking(crate::backends::camera::enumerate_cameras)
                        .await
                        .unwrap_or_default();
                info!(count = cameras.len(), "Found camera(s)");

                let camera_index = match select_index {
                    Some(index) if index < cameras.len() => index,
                    _ => last_camera_path
                        .as_ref()
                        .and_then(|last_path| {
                            cameras.iter().position(|cam| &cam.path == last_path)
                        })
                        .unwrap_or(0),
                };

                let formats = match cameras.get(camera_index) {
                    Some(camera) => {
                        let camera = camera.clone();
                        tokio::task::spawn_blocking(move || {
                            crate::backends::camera::get_formats(&camera)
                        })
                        .await
                        .unwrap_or_default()
                    }
                    None => Vec::new(),
                };

                (cameras, camera_index, formats)
            },
            |(cameras, index, formats)| {
                cosmic::Action::App(Message::CamerasInitialized(cameras, index, formats))
            },
        )
    }

    // =========================================================================
    // Camera Control Handlers
    // =========================================================================

    pub(crate) fn handle_switch_camera(&mut self) -> Task<cosmic::Action<Message>> {
        info!(
            current_index = self.current_camera_index,
            "Received SwitchCamera message"
        );

        if self.available_cameras.len() < 2 {
            info!("Only one camera available, cannot switch");
            return Task::none();
        }

        let next = next_camera_index(&self.available_cameras, self.current_camera_index);
        self.select_camera(next)
    }

    pub(crate) fn handle_select_camera(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        if index >= self.available_cameras.len() || index == self.current_camera_index {
            return Task::none();
        }
        self.select_camera(index)
    }

    /// Switch the preview to the camera at `index`.
    ///
    /// Cancels the running pipeline, starts the dim transition, and
    /// re-enumerates formats for the new device.
    fn select_camera(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        let camera_name = &self.available_cameras[index].name;
        info!(new_index = index, camera = %camera_name, "Switching to camera");

        // Flag the old subscription loop to stop, then arm a fresh flag for
        // the next one
        self.camera_cancel_flag
            .store(true, std::sync::atomic::Ordering::Release);
        self.camera_cancel_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

        self.current_camera_index = index;
        self.transition_state.start();

        self.enumerate_cameras_task(Some(index))
    }

    pub(crate) fn handle_camera_frame(
        &mut self,
        frame: Arc<CameraFrame>,
    ) -> Task<cosmic::Action<Message>> {
        let preview_handle = self.build_preview_handle(&frame);

        if let Some(task) = self.transition_state.on_frame_received() {
            self.current_frame = Some(frame);
            self.preview_handle = Some(preview_handle);
            return task.map(cosmic::Action::App);
        }

        self.current_frame = Some(frame);
        self.preview_handle = Some(preview_handle);
        Task::none()
    }

    /// Render a frame for the preview widget, mirroring it when the selfie
    /// mirror is enabled. Saved photos are never mirrored.
    fn build_preview_handle(&self, frame: &CameraFrame) -> cosmic::widget::image::Handle {
        let pixels = if self.config.mirror_preview {
            crate::pipelines::photo::processing::mirror_rgba(&frame.data, frame.width, frame.height)
        } else {
            frame.data.to_vec()
        };

        cosmic::widget::image::Handle::from_rgba(frame.width, frame.height, pixels)
    }

    pub(crate) fn handle_cameras_initialized(
        &mut self,
        cameras: Vec<CameraDevice>,
        camera_index: usize,
        formats: Vec<CameraFormat>,
    ) -> Task<cosmic::Action<Message>> {
        info!(
            count = cameras.len(),
            camera_index, "Cameras initialized"
        );

        self.available_cameras = cameras;
        self.current_camera_index = camera_index;
        self.available_formats = formats.clone();

        self.camera_dropdown_options = self
            .available_cameras
            .iter()
            .map(|cam| {
                cam.name
                    .strip_suffix(" (V4L2)")
                    .unwrap_or(&cam.name)
                    .to_string()
            })
            .collect();

        if self.available_cameras.is_empty() {
            warn!("No cameras found");
            return self.show_notice(fl!("no-cameras"));
        }

        // Photos want the largest sensor area the camera offers
        self.active_format =
            crate::backends::camera::pipewire::select_max_resolution_format(&formats);

        if let Some(format) = &self.active_format {
            info!(format = %format, "Selected preview format");
        }

        // Remember the camera for the next run
        let current_path = self.available_cameras[self.current_camera_index].path.clone();
        if self.config.last_camera_path.as_deref() != Some(current_path.as_str()) {
            self.config.last_camera_path = Some(current_path);
            if let Some(handler) = self.config_handler.as_ref()
                && let Err(err) = self.config.write_entry(handler)
            {
                error!(?err, "Failed to save last camera");
            }
        }

        info!("Camera initialization complete, preview will start");
        Task::none()
    }

    pub(crate) fn handle_camera_list_changed(
        &mut self,
        new_cameras: Vec<CameraDevice>,
    ) -> Task<cosmic::Action<Message>> {
        info!(
            old_count = self.available_cameras.len(),
            new_count = new_cameras.len(),
            "Camera list changed (hotplug event)"
        );

        // Keep the current camera if it survived the hotplug event
        let current_path = self
            .available_cameras
            .get(self.current_camera_index)
            .map(|c| c.path.clone());

        let new_index = current_path
            .and_then(|path| new_cameras.iter().position(|c| c.path == path))
            .unwrap_or(0);

        let camera_disappeared = new_index == 0
            && self.current_camera_index != 0
            && !self.available_cameras.is_empty();

        if camera_disappeared {
            warn!("Active camera disconnected, falling back to first camera");
            self.camera_cancel_flag
                .store(true, std::sync::atomic::Ordering::Release);
            self.camera_cancel_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
            self.transition_state.start();
        }

        if new_cameras.is_empty() {
            self.available_cameras = Vec::new();
            self.camera_dropdown_options = Vec::new();
            self.current_camera_index = 0;
            self.active_format = None;
            self.preview_handle = None;
            self.current_frame = None;
            return self.show_notice(fl!("no-cameras"));
        }

        self.enumerate_camera_formats(new_cameras, new_index)
    }

    /// Apply a changed camera list and fetch formats for the chosen camera
    fn enumerate_camera_formats(
        &mut self,
        cameras: Vec<CameraDevice>,
        index: usize,
    ) -> Task<cosmic::Action<Message>> {
        Task::perform(
            async move {
                let formats = match cameras.get(index) {
                    Some(camera) => {
                        let camera = camera.clone();
                        tokio::task::spawn_blocking(move || {
                            crate::backends::camera::get_formats(&camera)
                        })
                        .await
                        .unwrap_or_default()
                    }
                    None => Vec::new(),
                };
                (cameras, index, formats)
            },
            |(cameras, index, formats)| {
                cosmic::Action::App(Message::CamerasInitialized(cameras, index, formats))
            },
        )
    }

    pub(crate) fn handle_clear_transition_blur(&mut self) -> Task<cosmic::Action<Message>> {
        self.transition_state.clear();
        Task::none()
    }
}
