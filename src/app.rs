//! # Application Module
//!
//! `Sweetie` is the composition root: it owns the one graph slider, the
//! persisted config and the demo controls, and routes iced messages to them.
//!
//! ## Frame Loop
//! A 16 ms subscription drives both slider springs with wall-clock time, the
//! same cadence the chart is redrawn at.
//!
//! ## Pointer Routing
//! The chart reports raw face coordinates. A press on the guide-line hitbox
//! starts a drag, anywhere else starts a pan; a release that ends anything but
//! a drag is also delivered as a click.

use crate::charts::GlucoseChart;
use crate::config::Config;
use crate::curve::CubicPath;
use crate::markers::MarkerKind;
use crate::slider::{GraphSlider, ScrubState, ViewportX};
use crate::trend::Trend;
use crate::ui::styles;
use crate::zones::{color_for_glucose, Rgb};
use iced::widget::{button, column, container, row, text};
use iced::{Element, Length, Subscription, Task};
use log::{error, info, warn};
use plotters_iced::ChartWidget;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// Curve shown on launch, ending at 7.8 mmol/L
pub const DEFAULT_GRAPH_PATH: &str = "M0,72 C30,70 60,110 100,120 C140,130 170,115 206,118";

/// On-screen size of the 252 px face
const FACE_DISPLAY_SIZE: f32 = 378.0;

#[derive(Debug, Clone)]
pub enum Message {
    Tick(Instant),
    PointerPressed { x: f64, y: f64 },
    PointerMoved { x: f64 },
    PointerReleased { x: f64 },
    RegenerateGraph,
    CycleTrend,
    AddMarker(MarkerKind),
    ClearMarkers,
    ResetToNow,
    ToggleLanguage,
}

pub struct Sweetie {
    slider: GraphSlider,
    config: Config,
    trend: Trend,
}

/// mmol/L with a decimal comma, as printed on the watch
pub fn format_glucose(glucose: f64) -> String {
    format!("{:.1}", glucose).replace('.', ",")
}

impl Sweetie {
    pub fn new() -> (Self, Task<Message>) {
        let config = Config::load().unwrap_or_else(|e| {
            warn!("{}, using defaults", e);
            Config::default()
        });
        (Self::with_config(config), Task::none())
    }

    pub fn with_config(config: Config) -> Self {
        let mut rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let path = match CubicPath::from_svg(DEFAULT_GRAPH_PATH) {
            Ok(path) => path,
            Err(e) => {
                error!("Default graph path rejected: {}", e);
                crate::synth::generate_random_path(120.0, None, &mut rng)
            }
        };

        let slider = GraphSlider::new(path, config.language, rng);
        info!(
            "Watch ready at {} mmol/L {} ({})",
            format_glucose(slider.now_glucose()),
            slider.now_trend().arrow(),
            color_for_glucose(slider.now_glucose()).to_hex()
        );

        Self {
            trend: slider.now_trend(),
            slider,
            config,
        }
    }

    pub fn slider(&self) -> &GraphSlider {
        &self.slider
    }

    /// Live reading color, used wherever the slider defers at "now"
    pub fn accent(&self) -> Rgb {
        color_for_glucose(self.slider.now_glucose())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick(now) => {
                self.slider.tick(now);
            }
            Message::PointerPressed { x, y } => {
                let at = ViewportX(x);
                let on_handle = self.slider.hits_handle(at, y);
                self.slider.pointer_down(at, on_handle);
            }
            Message::PointerMoved { x } => {
                self.slider.pointer_move(ViewportX(x));
            }
            Message::PointerReleased { x } => {
                let was_dragging = self.slider.state() == ScrubState::Dragging;
                self.slider.pointer_up();
                if !was_dragging {
                    self.slider.click(ViewportX(x));
                }
            }
            Message::RegenerateGraph => {
                self.slider.regenerate(Some(self.trend));
            }
            Message::CycleTrend => {
                self.trend = self.trend.next();
                self.slider.regenerate(Some(self.trend));
            }
            Message::AddMarker(kind) => {
                let value = match kind {
                    MarkerKind::Insulin => 4,
                    _ => 1,
                };
                self.slider.add_context_marker(kind, value);
            }
            Message::ClearMarkers => {
                self.slider.clear_context_markers();
            }
            Message::ResetToNow => {
                self.slider.reset();
            }
            Message::ToggleLanguage => {
                self.config.language = self.config.language.toggled();
                self.slider.set_language(self.config.language);
                if let Err(e) = self.config.save() {
                    error!("{}", e);
                }
                info!("Language set to {:?}", self.config.language);
            }
        }
        Task::none()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        iced::time::every(std::time::Duration::from_millis(16)).map(Message::Tick)
    }

    pub fn view(&'_ self) -> Element<'_, Message> {
        let face = ChartWidget::new(GlucoseChart { state: self })
            .width(Length::Fixed(FACE_DISPLAY_SIZE))
            .height(Length::Fixed(FACE_DISPLAY_SIZE));

        let content = column![face, self.create_controls(), self.create_marker_bar()]
            .spacing(12)
            .align_x(iced::alignment::Horizontal::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center(Length::Fill)
            .into()
    }

    fn create_controls(&self) -> Element<'_, Message> {
        let at_now = self.slider.frame().at_now && self.slider.pan_offset() == 0.0;

        let now_button = button(text("Now"))
            .on_press_maybe(if at_now { None } else { Some(Message::ResetToNow) })
            .padding(8)
            .style(styles::now_button_style());

        let regenerate_button = button(text("New curve"))
            .on_press(Message::RegenerateGraph)
            .padding(8)
            .style(styles::control_button_style(false));

        let trend_button = button(text(format!("Trend {}", self.trend.arrow())))
            .on_press(Message::CycleTrend)
            .padding(8)
            .style(styles::control_button_style(true));

        let language_label = match self.slider.language() {
            crate::fuzzy_time::Language::En => "EN",
            crate::fuzzy_time::Language::Hr => "HR",
        };
        let language_button = button(text(language_label))
            .on_press(Message::ToggleLanguage)
            .padding(8)
            .style(styles::control_button_style(false));

        row![now_button, regenerate_button, trend_button, language_button]
            .spacing(8)
            .into()
    }

    fn create_marker_bar(&self) -> Element<'_, Message> {
        let marker_button = |kind: MarkerKind| {
            button(text(kind.glyph()))
                .on_press(Message::AddMarker(kind))
                .padding(8)
                .style(styles::control_button_style(false))
        };

        let clear_button = button(text("Clear"))
            .on_press_maybe(if self.slider.markers().is_empty() {
                None
            } else {
                Some(Message::ClearMarkers)
            })
            .padding(8)
            .style(styles::clear_button_style());

        row![
            marker_button(MarkerKind::Meal),
            marker_button(MarkerKind::Insulin),
            marker_button(MarkerKind::Activity),
            marker_button(MarkerKind::Med),
            clear_button,
        ]
        .spacing(8)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy_time::Language;

    fn app() -> Sweetie {
        Sweetie::with_config(Config {
            language: Language::En,
            random_seed: Some(9),
        })
    }

    #[test]
    fn test_glucose_uses_decimal_comma() {
        assert_eq!(format_glucose(7.84), "7,8");
        assert_eq!(format_glucose(10.0), "10,0");
    }

    #[test]
    fn test_starts_on_default_curve() {
        let app = app();
        assert!((app.slider().now_glucose() - 7.8).abs() < 1e-6);
        assert_eq!(app.accent(), Rgb::SAFE);
        assert!(app.slider().frame().at_now);
    }

    #[test]
    fn test_release_without_drag_is_click() {
        let mut app = app();
        let _ = app.update(Message::PointerPressed { x: 60.0, y: 30.0 });
        let _ = app.update(Message::PointerReleased { x: 60.0 });
        assert_eq!(app.slider().state(), ScrubState::Animating);
    }

    #[test]
    fn test_handle_drag_is_not_a_click() {
        let mut app = app();
        let _ = app.update(Message::PointerPressed { x: 206.0, y: 126.0 });
        assert_eq!(app.slider().state(), ScrubState::Dragging);
        let _ = app.update(Message::PointerMoved { x: 150.0 });
        let _ = app.update(Message::PointerReleased { x: 150.0 });
        assert_eq!(app.slider().state(), ScrubState::Idle);
        assert_eq!(app.slider().frame().graph_x.0, 150.0);
    }

    #[test]
    fn test_cycle_trend_regenerates() {
        let mut app = app();
        let before = app.slider().current_path().clone();
        let trend = app.trend;
        let _ = app.update(Message::CycleTrend);
        assert_eq!(app.trend, trend.next());
        assert_ne!(app.slider().current_path(), &before);
    }

    #[test]
    fn test_marker_messages() {
        let mut app = app();
        let _ = app.update(Message::AddMarker(MarkerKind::Insulin));
        let _ = app.update(Message::AddMarker(MarkerKind::Meal));
        assert_eq!(app.slider().markers().len(), 2);
        assert_eq!(app.slider().markers()[0].value, 4);
        let _ = app.update(Message::ClearMarkers);
        assert!(app.slider().markers().is_empty());
    }
}
