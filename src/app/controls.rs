// SPDX-License-Identifier: GPL-3.0-only

//! Capture button and bottom control bar widgets

use crate::app::state::{AppModel, Message};
use crate::constants::ui;
use crate::fl;
use crate::flash::FlashMode;
use cosmic::Element;
use cosmic::iced::{Alignment, Background, Color, Length};
use cosmic::widget::{self, icon};

impl AppModel {
    /// Build the capture button widget
    ///
    /// A white circle that briefly shrinks while a capture is running.
    /// Disabled and grayed out during camera transitions.
    pub fn build_capture_button(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();
        let is_disabled = self.transition_state.ui_disabled;

        let capture_button_color = if is_disabled {
            Color::from_rgba(0.5, 0.5, 0.5, 0.3)
        } else if self.is_capturing {
            Color::from_rgb(0.7, 0.7, 0.7)
        } else {
            Color::WHITE
        };

        // Press down effect while capturing
        let (inner_size, outer_size) = if self.is_capturing {
            (
                ui::CAPTURE_BUTTON_INNER * 0.85,
                ui::CAPTURE_BUTTON_OUTER * 0.85,
            )
        } else {
            (ui::CAPTURE_BUTTON_INNER, ui::CAPTURE_BUTTON_OUTER)
        };

        let button_inner = widget::container(widget::Space::new(
            Length::Fixed(inner_size),
            Length::Fixed(inner_size),
        ))
        .style(move |_theme| widget::container::Style {
            background: Some(Background::Color(capture_button_color)),
            border: cosmic::iced::Border {
                radius: [ui::CAPTURE_BUTTON_RADIUS * (inner_size / ui::CAPTURE_BUTTON_INNER); 4]
                    .into(),
                ..Default::default()
            },
            ..Default::default()
        });

        let button = if is_disabled {
            // No on_press handler when disabled (non-clickable)
            widget::button::custom(button_inner)
                .padding(0)
                .width(Length::Fixed(outer_size))
                .height(Length::Fixed(outer_size))
        } else {
            widget::button::custom(button_inner)
                .on_press(Message::Capture)
                .padding(0)
                .width(Length::Fixed(outer_size))
                .height(Length::Fixed(outer_size))
        };

        // Fixed-size wrapper prevents layout shift when the button shrinks
        let button_wrapper = widget::container(button)
            .width(Length::Fixed(ui::CAPTURE_BUTTON_OUTER))
            .height(Length::Fixed(ui::CAPTURE_BUTTON_OUTER))
            .center_x(ui::CAPTURE_BUTTON_OUTER)
            .center_y(ui::CAPTURE_BUTTON_OUTER);

        widget::container(button_wrapper)
            .width(Length::Fill)
            .center_x(Length::Fill)
            .padding([spacing.space_xs, 0])
            .into()
    }

    /// Build the gallery button widget
    ///
    /// Shows the latest photo as a thumbnail if available, otherwise a
    /// folder icon.
    pub fn build_gallery_button(&self) -> Element<'_, Message> {
        let is_disabled = self.transition_state.ui_disabled;

        let button_content: Element<'_, Message> =
            if let Some(thumbnail) = &self.gallery_thumbnail {
                let image = widget::image::Image::new(thumbnail.clone())
                    .content_fit(cosmic::iced::ContentFit::Cover)
                    .width(Length::Fixed(38.0))
                    .height(Length::Fixed(38.0));

                widget::container(image)
                    .width(Length::Fixed(40.0))
                    .height(Length::Fixed(40.0))
                    .into()
            } else {
                widget::container(icon::from_name("folder-pictures-symbolic").size(24))
                    .width(Length::Fixed(40.0))
                    .height(Length::Fixed(40.0))
                    .center(40.0)
                    .into()
            };

        let mut btn = widget::button::custom(button_content)
            .padding(0)
            .width(Length::Fixed(40.0))
            .height(Length::Fixed(40.0))
            .class(cosmic::theme::Button::Image);

        if !is_disabled {
            btn = btn.on_press(Message::OpenGallery);
        }

        btn.into()
    }

    /// Build the bottom control bar: gallery, torch, flash mode, camera switch
    pub fn build_control_bar(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();
        let is_disabled = self.transition_state.ui_disabled;

        let torch_label = if self.torch_on {
            fl!("torch-on")
        } else {
            fl!("torch-off")
        };

        let flash_label = match self.config.flash_mode {
            FlashMode::Off => fl!("flash-off"),
            FlashMode::On => fl!("flash-on"),
            FlashMode::Auto => fl!("flash-auto"),
        };

        let mut torch_button = widget::button::text(torch_label);
        let mut flash_button = widget::button::text(flash_label);
        let mut switch_button =
            widget::button::icon(icon::from_name("camera-switch-symbolic"));

        if !is_disabled {
            torch_button = torch_button.on_press(Message::ToggleTorch);
            flash_button = flash_button.on_press(Message::CycleFlashMode);
            if self.available_cameras.len() > 1 {
                switch_button = switch_button.on_press(Message::SwitchCamera);
            }
        }

        widget::row()
            .push(self.build_gallery_button())
            .push(widget::horizontal_space().width(Length::Fill))
            .push(torch_button)
            .push(widget::horizontal_space().width(spacing.space_s))
            .push(flash_button)
            .push(widget::horizontal_space().width(Length::Fill))
            .push(switch_button)
            .align_y(Alignment::Center)
            .width(Length::Fill)
            .padding([spacing.space_xs, spacing.space_m])
            .into()
    }
}
