// SPDX-License-Identifier: GPL-3.0-only

//! Main application module for Viewfinder
//!
//! This module contains the application state, message handling, UI rendering,
//! and business logic for the camera application.
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Message, PermissionState)
//! - `controls`: Capture button and the bottom control bar
//! - `handlers`: Message handlers organized by functional domain
//! - `view`: Main view rendering (preview, placeholder, settings drawer)
//! - `update`: Message dispatch

mod controls;
mod handlers;
mod state;
mod update;
mod view;

use crate::config::Config;
use crate::fl;
use cosmic::app::context_drawer;
use cosmic::cosmic_config::{self, CosmicConfigEntry};
use cosmic::iced::Subscription;
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
pub use state::{AppModel, ContextPage, Message, Notice, PermissionState, TransitionState};
use std::sync::Arc;
use tracing::{error, info, warn};

const REPOSITORY: &str = "https://github.com/viewfinder-app/viewfinder";

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = ();

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "io.github.viewfinder.Viewfinder";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        _flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        // Create the about widget
        let about = About::default()
            .name(fl!("app-title"))
            .version(env!("GIT_VERSION"))
            .links([(fl!("repository"), REPOSITORY)])
            .license(env!("CARGO_PKG_LICENSE"));

        // Load configuration
        let (config_handler, config) =
            match cosmic_config::Config::new(Self::APP_ID, Config::VERSION) {
                Ok(handler) => {
                    let config = match Config::get_entry(&handler) {
                        Ok(config) => config,
                        Err((errors, config)) => {
                            error!(?errors, "Errors loading config");
                            config
                        }
                    };
                    (Some(handler), config)
                }
                Err(err) => {
                    error!(%err, "Failed to create config handler");
                    (None, Config::default())
                }
            };

        // Ensure photo directory exists
        if let Err(e) = crate::storage::ensure_photo_directory() {
            error!(error = %e, "Failed to create photo directory");
        }

        // Initialize GStreamer early (required before any GStreamer calls)
        if let Err(e) = gstreamer::init() {
            error!(error = %e, "Failed to initialize GStreamer");
        }

        // Discover torch/flash LED hardware
        let flash_hardware = crate::flash::FlashHardware::detect();
        if let Some(error) = &flash_hardware.permission_error {
            warn!(%error, "Flash hardware present but not controllable");
        }

        let theme_dropdown_options = vec![
            "Match desktop".to_string(),
            "Dark".to_string(),
            "Light".to_string(),
        ];

        let app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            config,
            config_handler,
            permission: PermissionState::default(),
            torch_on: false,
            flash_active: false,
            is_capturing: false,
            capture_in_flight: false,
            notice: None,
            notice_seq: 0,
            gallery_thumbnail: None,
            flash_hardware,
            camera_cancel_flag: Arc::new(std::sync::atomic::AtomicBool::new(false)),
            current_frame: None,
            preview_handle: None,
            available_cameras: Vec::new(),
            current_camera_index: 0,
            available_formats: Vec::new(),
            active_format: None,
            camera_dropdown_options: Vec::new(),
            theme_dropdown_options,
            transition_state: TransitionState::default(),
        };

        // Ask for camera access once per screen appearance; enumeration
        // starts when the answer arrives
        let permission_task = Task::perform(crate::portal::request_camera_access(), |result| {
            cosmic::Action::App(Message::PermissionResolved(result))
        });

        // Load initial gallery thumbnail
        let thumbnail_task = Task::perform(
            async { crate::storage::load_latest_thumbnail(crate::storage::photo_directory()).await },
            |handle| cosmic::Action::App(Message::GalleryThumbnailLoaded(handle)),
        );

        (app, Task::batch([permission_task, thumbnail_task]))
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        let is_disabled = self.transition_state.ui_disabled;

        if is_disabled {
            // Disabled settings button during transitions
            let settings_button =
                widget::button::icon(widget::icon::from_name("preferences-system-symbolic"));
            vec![
                widget::container(settings_button)
                    .style(|_theme| widget::container::Style {
                        text_color: Some(cosmic::iced::Color::from_rgba(1.0, 1.0, 1.0, 0.3)),
                        ..Default::default()
                    })
                    .into(),
            ]
        } else {
            vec![
                widget::button::icon(widget::icon::from_name("preferences-system-symbolic"))
                    .on_press(Message::ToggleContextPage(ContextPage::Settings))
                    .into(),
            ]
        }
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
            ContextPage::Settings => self.settings_view(),
        })
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        use cosmic::iced::futures::{SinkExt, StreamExt};

        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        // The preview only binds while permission is granted; the placeholder
        // never gets a pipeline
        if self.permission != PermissionState::Granted {
            return config_sub;
        }

        let current_camera = self
            .available_cameras
            .get(self.current_camera_index)
            .cloned();
        let camera_index = self.current_camera_index;
        let current_format = self.active_format.clone();
        let cancel_flag = Arc::clone(&self.camera_cancel_flag);

        // A unique ID from the format properties restarts the subscription
        // when the format changes
        let format_id = current_format
            .as_ref()
            .map(|f| (f.width, f.height, f.framerate, f.pixel_format.clone()));

        // Restart the subscription once enumeration fills the camera list
        let cameras_initialized = !self.available_cameras.is_empty();

        let camera_sub = Subscription::run_with_id(
            ("camera", camera_index, format_id, cameras_initialized),
            cosmic::iced::stream::channel(100, move |mut output| async move {
                info!(camera_index, "Camera subscription started");

                loop {
                    // Check cancel flag at the start of each loop iteration
                    // to avoid creating pipelines after a camera switch
                    if cancel_flag.load(std::sync::atomic::Ordering::Acquire) {
                        info!("Cancel flag set - subscription loop exiting");
                        break;
                    }

                    // No camera yet: exit, the subscription restarts when
                    // cameras become available
                    let Some(device) = current_camera.clone() else {
                        info!("No camera available - waiting for enumeration");
                        break;
                    };
                    let Some(format) = current_format.clone() else {
                        info!("No format selected - waiting for enumeration");
                        break;
                    };

                    // Give the previous pipeline time to clean up
                    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
                    if cancel_flag.load(std::sync::atomic::Ordering::Acquire) {
                        break;
                    }

                    let (sender, mut receiver) = futures::channel::mpsc::channel(100);

                    let pipeline = match crate::backends::camera::pipewire::PipeWirePipeline::new(
                        &device, &format, sender,
                    ) {
                        Ok(pipeline) => pipeline,
                        Err(e) => {
                            error!(error = %e, "Failed to initialize pipeline");
                            info!("Waiting 5 seconds before retry...");
                            tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
                            continue;
                        }
                    };

                    info!("Waiting for frames from pipeline...");
                    loop {
                        if cancel_flag.load(std::sync::atomic::Ordering::Acquire) {
                            info!("Cancel flag set - camera subscription cancelled");
                            break;
                        }

                        if output.is_closed() {
                            info!("Output channel closed - camera subscription cancelled");
                            break;
                        }

                        // Wait for the next frame with a timeout so the cancel
                        // flag is still observed while the camera stalls
                        match tokio::time::timeout(
                            tokio::time::Duration::from_millis(16),
                            receiver.next(),
                        )
                        .await
                        {
                            Ok(Some(frame)) => {
                                // Dropping frames is fine for live preview -
                                // we want the latest frame
                                if let Err(e) =
                                    output.try_send(Message::CameraFrame(Arc::new(frame)))
                                {
                                    if e.is_disconnected() {
                                        info!("Output channel disconnected");
                                        break;
                                    }
                                }
                            }
                            Ok(None) => {
                                info!("Pipeline frame stream ended");
                                break;
                            }
                            Err(_) => continue,
                        }
                    }

                    info!("Cleaning up camera pipeline");
                    drop(pipeline);
                }
            }),
        );

        // Camera hotplug monitoring subscription
        let current_cameras = self.available_cameras.clone();
        let hotplug_sub = Subscription::run_with_id(
            "camera_hotplug",
            cosmic::iced::stream::channel(10, move |mut output| async move {
                info!("Camera hotplug monitoring started");

                let mut last_cameras = current_cameras;

                loop {
                    tokio::time::sleep(std::time::Duration::from_secs(
                        crate::constants::timing::HOTPLUG_POLL_SECS,
                    ))
                    .await;

                    // Enumeration shells out to pw-cli; keep it off the executor
                    let new_cameras =
                        tokio::task::spawn_blocking(crate::backends::camera::enumerate_cameras)
                            .await
                            .unwrap_or_default();

                    let cameras_changed = last_cameras.len() != new_cameras.len()
                        || !last_cameras.iter().all(|c| {
                            new_cameras
                                .iter()
                                .any(|nc| nc.path == c.path && nc.name == c.name)
                        });

                    if cameras_changed {
                        info!(
                            old_count = last_cameras.len(),
                            new_count = new_cameras.len(),
                            "Camera list changed - hotplug event detected"
                        );

                        last_cameras = new_cameras.clone();

                        if output
                            .send(Message::CameraListChanged(new_cameras))
                            .await
                            .is_err()
                        {
                            warn!("Failed to send camera list changed message - channel closed");
                            break;
                        }
                    }
                }
            }),
        );

        Subscription::batch([config_sub, camera_sub, hotplug_sub])
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}
