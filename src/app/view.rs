// SPDX-License-Identifier: GPL-3.0-only

//! Main application view
//!
//! Composes the main UI: camera preview (or the permission placeholder),
//! capture button, bottom control bar, transient notice banner, and the
//! white flash overlay.

use crate::app::state::{AppModel, Message, PermissionState};
use crate::fl;
use cosmic::Element;
use cosmic::app::context_drawer;
use cosmic::iced::{Alignment, Background, Color, Length};
use cosmic::widget::{self, icon};

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        // Flash firing - show only the preview under a white overlay, no UI
        if self.flash_active {
            let camera_preview = self.build_camera_preview();

            let flash_overlay = widget::container(widget::Space::new(Length::Fill, Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(|_theme| widget::container::Style {
                    background: Some(Background::Color(Color::WHITE)),
                    ..Default::default()
                });

            return widget::container(
                cosmic::iced::widget::stack![camera_preview, flash_overlay]
                    .width(Length::Fill)
                    .height(Length::Fill),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| widget::container::Style {
                background: Some(Background::Color(Color::BLACK)),
                ..Default::default()
            })
            .into();
        }

        let content: Element<'_, Message> = match self.permission {
            PermissionState::Requesting => self.build_placeholder(fl!("waiting-permission")),
            PermissionState::Denied => self.build_placeholder(fl!("permission-denied")),
            PermissionState::Granted => self.build_camera_screen(),
        };

        // Notice banner floats over whatever is below it
        let content: Element<'_, Message> = if let Some(notice) = &self.notice {
            let banner = widget::container(
                widget::container(widget::text(notice.text.clone()))
                    .padding([8, 16])
                    .style(|_theme| widget::container::Style {
                        background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.75))),
                        text_color: Some(Color::WHITE),
                        border: cosmic::iced::Border {
                            radius: [8.0; 4].into(),
                            ..Default::default()
                        },
                        ..Default::default()
                    }),
            )
            .width(Length::Fill)
            .center_x(Length::Fill)
            .padding([24, 0]);

            cosmic::iced::widget::stack![content, banner]
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        } else {
            content
        };

        widget::container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_theme| widget::container::Style {
                background: Some(Background::Color(Color::BLACK)),
                ..Default::default()
            })
            .into()
    }

    /// The non-functional placeholder shown before permission is granted
    /// (and for the rest of the session when it is denied)
    fn build_placeholder(&self, message: String) -> Element<'_, Message> {
        let content = widget::column()
            .push(icon::from_name("camera-disabled-symbolic").size(64))
            .push(widget::vertical_space().height(16))
            .push(widget::text(message).size(16))
            .align_x(Alignment::Center);

        widget::container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center(Length::Fill)
            .into()
    }

    /// The live screen: preview on top, capture button and control bar below
    fn build_camera_screen(&self) -> Element<'_, Message> {
        widget::column()
            .push(self.build_camera_preview())
            .push(self.build_capture_button())
            .push(self.build_control_bar())
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Build the camera preview widget (or its waiting states)
    pub(crate) fn build_camera_preview(&self) -> Element<'_, Message> {
        let preview: Element<'_, Message> = if let Some(handle) = &self.preview_handle {
            widget::image::Image::new(handle.clone())
                .content_fit(cosmic::iced::ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        } else {
            let message = if self.available_cameras.is_empty() {
                fl!("no-cameras")
            } else {
                fl!("starting-preview")
            };

            widget::container(widget::text(message))
                .width(Length::Fill)
                .height(Length::Fill)
                .center(Length::Fill)
                .into()
        };

        // Dim the stale frame while the camera restarts
        if self.transition_state.should_blur() {
            let dim = widget::container(widget::Space::new(Length::Fill, Length::Fill))
                .width(Length::Fill)
                .height(Length::Fill)
                .style(|_theme| widget::container::Style {
                    background: Some(Background::Color(Color::from_rgba(0.0, 0.0, 0.0, 0.6))),
                    ..Default::default()
                });

            cosmic::iced::widget::stack![preview, dim]
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        } else {
            preview
        }
    }

    /// Create the settings view for the context drawer
    pub fn settings_view(&self) -> context_drawer::ContextDrawer<'_, Message> {
        let spacing = cosmic::theme::spacing();

        // Camera selection dropdown
        let camera_dropdown = widget::dropdown(
            &self.camera_dropdown_options,
            Some(self.current_camera_index),
            Message::SelectCamera,
        );

        // Theme dropdown
        let theme_index = match self.config.app_theme {
            crate::config::AppTheme::System => 0,
            crate::config::AppTheme::Dark => 1,
            crate::config::AppTheme::Light => 2,
        };
        let theme_dropdown = widget::dropdown(
            &self.theme_dropdown_options,
            Some(theme_index),
            Message::SetAppTheme,
        );

        // Mirror preview toggle
        let mirror_toggle =
            widget::toggler(self.config.mirror_preview).on_toggle(|_| Message::ToggleMirrorPreview);

        let version_info = if crate::constants::app_info::is_flatpak() {
            format!("Version {} (Flatpak)", crate::constants::app_info::version())
        } else {
            format!("Version {}", crate::constants::app_info::version())
        };

        let settings_column: Element<'_, Message> = widget::column()
            .push(widget::text("Camera").size(16).font(cosmic::font::bold()))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(camera_dropdown)
            .push(widget::vertical_space().height(spacing.space_s))
            .push(widget::text("Theme").size(16).font(cosmic::font::bold()))
            .push(widget::vertical_space().height(spacing.space_xxs))
            .push(theme_dropdown)
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(
                widget::row()
                    .push(
                        widget::text("Mirror Preview")
                            .size(16)
                            .font(cosmic::font::bold()),
                    )
                    .push(widget::horizontal_space().width(Length::Fill))
                    .push(mirror_toggle)
                    .align_y(Alignment::Center),
            )
            .push(widget::vertical_space().height(spacing.space_l))
            .push(widget::divider::horizontal::default())
            .push(widget::vertical_space().height(spacing.space_s))
            .push(
                widget::text(version_info)
                    .size(12)
                    .class(cosmic::theme::Text::Accent),
            )
            .spacing(0)
            .into();

        context_drawer::context_drawer(
            settings_column,
            Message::ToggleContextPage(crate::app::state::ContextPage::Settings),
        )
        .title("Settings")
    }
}
