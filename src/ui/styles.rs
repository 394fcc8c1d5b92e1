//! # UI Styling Module
//!
//! Button styles for the controls under the watch face. The face itself is
//! black, so every control sits on dark fills with light text.

use iced::widget::button;
use iced::{Background, Border, Color};

fn filled(background: Color, border: Color, text_color: Color, width: f32) -> button::Style {
    button::Style {
        background: Some(Background::Color(background)),
        text_color,
        border: Border {
            color: border,
            width,
            radius: 14.0.into(),
        },
        ..Default::default()
    }
}

fn disabled() -> button::Style {
    filled(
        Color::from_rgb(0.12, 0.12, 0.12),
        Color::from_rgb(0.2, 0.2, 0.2),
        Color::from_rgb(0.4, 0.4, 0.4),
        1.0,
    )
}

/// Style for demo controls; `is_selected` marks the one bound to the curve trend
pub fn control_button_style(is_selected: bool) -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    move |_theme: &iced::Theme, status: button::Status| {
        let width = if is_selected { 2.0 } else { 1.0 };
        match status {
            button::Status::Active => {
                if is_selected {
                    filled(Color::from_rgb(0.16, 0.22, 0.12), Color::from_rgb(0.49, 0.83, 0.13), Color::WHITE, width)
                } else {
                    filled(Color::from_rgb(0.17, 0.17, 0.18), Color::from_rgb(0.3, 0.3, 0.32), Color::WHITE, width)
                }
            }
            button::Status::Hovered => {
                if is_selected {
                    filled(Color::from_rgb(0.22, 0.3, 0.16), Color::from_rgb(0.6, 0.9, 0.3), Color::WHITE, width)
                } else {
                    filled(Color::from_rgb(0.24, 0.24, 0.26), Color::from_rgb(0.4, 0.4, 0.42), Color::WHITE, width)
                }
            }
            button::Status::Pressed => {
                if is_selected {
                    filled(Color::from_rgb(0.1, 0.16, 0.08), Color::from_rgb(0.4, 0.7, 0.1), Color::WHITE, width)
                } else {
                    filled(Color::from_rgb(0.12, 0.12, 0.13), Color::from_rgb(0.25, 0.25, 0.27), Color::WHITE, width)
                }
            }
            button::Status::Disabled => disabled(),
        }
    }
}

/// Style for the "Now" button (safe-zone green)
pub fn now_button_style() -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    |_theme: &iced::Theme, status: button::Status| match status {
        button::Status::Active => filled(
            Color::from_rgb(0.49, 0.83, 0.13),
            Color::from_rgb(0.58, 0.9, 0.25),
            Color::BLACK,
            1.0,
        ),
        button::Status::Hovered => filled(
            Color::from_rgb(0.58, 0.9, 0.25),
            Color::from_rgb(0.68, 0.95, 0.38),
            Color::BLACK,
            1.0,
        ),
        button::Status::Pressed => filled(
            Color::from_rgb(0.4, 0.7, 0.1),
            Color::from_rgb(0.49, 0.83, 0.13),
            Color::BLACK,
            1.0,
        ),
        button::Status::Disabled => disabled(),
    }
}

/// Style for clearing markers (danger red)
pub fn clear_button_style() -> impl Fn(&iced::Theme, button::Status) -> button::Style {
    |_theme: &iced::Theme, status: button::Status| match status {
        button::Status::Active => filled(
            Color::from_rgb(0.8, 0.2, 0.2),
            Color::from_rgb(0.9, 0.3, 0.3),
            Color::WHITE,
            1.0,
        ),
        button::Status::Hovered => filled(
            Color::from_rgb(0.9, 0.3, 0.3),
            Color::from_rgb(1.0, 0.4, 0.4),
            Color::WHITE,
            1.0,
        ),
        button::Status::Pressed => filled(
            Color::from_rgb(0.7, 0.15, 0.15),
            Color::from_rgb(0.8, 0.2, 0.2),
            Color::WHITE,
            1.0,
        ),
        button::Status::Disabled => disabled(),
    }
}
