//! # Watch Face Chart
//!
//! Draws the 252 x 252 face through plotters-iced and turns mouse and touch
//! input on it into face-space pointer messages.
//!
//! ## Layers (back to front)
//! 1. Zone boundary lines
//! 2. Full glucose curve in grey
//! 3. Highlight of the zone segment under the scrub point
//! 4. Context marker connectors and badges
//! 5. Dashed scrub guide, dot and time label
//! 6. Clock and glucose reading
//!
//! Everything that lives on the curve is drawn at `graph x + pan offset`.

use crate::app::{format_glucose, Message, Sweetie};
use crate::markers::{marker_color, MarkerLayout};
use crate::slider::ViewportX;
use crate::zones::{Boundary, Rgb, FACE_SIZE};
use iced::widget::canvas;
use iced::{event, mouse, touch, Rectangle};
use log::warn;
use plotters::chart::{ChartBuilder, ChartContext};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::element::{Circle, PathElement, Rectangle as Rect, Text};
use plotters::series::LineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, IntoFont, RGBColor, BLACK, WHITE};
use plotters_iced::{Chart, DrawingBackend};
use std::fmt::Debug;

type Face = Cartesian2d<RangedCoordf64, RangedCoordf64>;

const GUIDE_DASH: f64 = 4.0;
const CLOCK_Y: f64 = 30.0;
const READING_Y: f64 = 222.0;
const LABEL_BADGE: RGBColor = RGBColor(28, 28, 30);

pub struct GlucoseChart<'a> {
    pub state: &'a Sweetie,
}

#[derive(Debug, Default)]
pub struct PointerState {
    pressed: bool,
    /// Last face x reported while pressed
    last_x: f64,
}

impl PointerState {
    fn press(&mut self, x: f64) {
        self.pressed = true;
        self.last_x = x;
    }

    /// Release at `x`, or where the pointer was last seen when the position is unknown
    fn release(&mut self, x: Option<f64>) -> f64 {
        self.pressed = false;
        if let Some(x) = x {
            self.last_x = x;
        }
        self.last_x
    }
}

fn to_plotters(color: Rgb) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

fn report<T, E: Debug>(result: Result<T, E>, what: &str) {
    if let Err(e) = result {
        warn!("Failed to draw {}: {:?}", what, e);
    }
}

/// Widget-relative position to face units
fn to_face(bounds: Rectangle, x: f32, y: f32) -> (f64, f64) {
    (
        f64::from(x) * FACE_SIZE / f64::from(bounds.width.max(1.0)),
        f64::from(y) * FACE_SIZE / f64::from(bounds.height.max(1.0)),
    )
}

fn absolute_to_face(bounds: Rectangle, position: iced::Point) -> (f64, f64) {
    to_face(bounds, position.x - bounds.x, position.y - bounds.y)
}

impl<'a> GlucoseChart<'a> {
    fn draw_boundaries<DB: DrawingBackend>(&self, chart: &mut ChartContext<'_, DB, Face>) {
        let lines = self.state.slider().boundaries().lines().map(|(y, boundary)| {
            let color = match boundary {
                Boundary::DangerHigh | Boundary::DangerLow => to_plotters(Rgb::DANGER),
                Boundary::WarningHigh | Boundary::WarningLow => to_plotters(Rgb::WARNING),
            };
            PathElement::new(vec![(0.0, y), (FACE_SIZE, y)], color.mix(0.3).stroke_width(1))
        });
        report(chart.draw_series(lines), "zone boundaries");
    }

    fn draw_curve<DB: DrawingBackend>(&self, chart: &mut ChartContext<'_, DB, Face>, scale: f64) {
        let slider = self.state.slider();
        let pan = slider.pan_offset();
        let frame = slider.frame();
        let on_face = |x: f64| (0.0..=FACE_SIZE).contains(&x);
        let width = (2.0 * scale).round() as u32;

        let base = slider
            .curve()
            .samples()
            .iter()
            .map(|s| (s.x + pan, s.y))
            .filter(|(x, _)| on_face(*x));
        report(
            chart.draw_series(LineSeries::new(base, to_plotters(Rgb::NEUTRAL_GREY).mix(0.6).stroke_width(width))),
            "curve",
        );

        let Some(clip) = frame.clip else {
            return;
        };
        let color = to_plotters(frame.color.unwrap_or_else(|| self.state.accent()));
        let highlight = slider
            .curve()
            .samples()
            .iter()
            .filter(|s| s.x >= clip.x && s.x <= clip.x + clip.width)
            .filter(|s| s.y >= clip.y - 1.0 && s.y <= clip.y + clip.height + 1.0)
            .map(|s| (s.x + pan, s.y))
            .filter(|(x, _)| on_face(*x));
        report(
            chart.draw_series(LineSeries::new(highlight, color.stroke_width(width + 1))),
            "highlight",
        );
    }

    fn draw_markers<DB: DrawingBackend>(&self, chart: &mut ChartContext<'_, DB, Face>, scale: f64) {
        let slider = self.state.slider();
        if slider.markers().is_empty() {
            return;
        }
        let pan = slider.pan_offset();
        let color = to_plotters(marker_color(slider.frame().at_now, self.state.accent()));
        let placements = MarkerLayout::default().layout(slider.markers(), slider.now_y());

        let connectors = placements.iter().map(|p| {
            PathElement::new(
                vec![(p.line_x + pan, p.line_from_y), (p.line_x + pan, p.line_to_y)],
                color.mix(0.7).stroke_width(1),
            )
        });
        report(chart.draw_series(connectors), "marker connectors");

        let badges = placements.iter().map(|p| {
            Rect::new([(p.x + pan, p.y), (p.x + pan + p.width, p.y + p.height)], color.filled())
        });
        report(chart.draw_series(badges), "marker badges");

        let font_size = (10.0 * scale).round();
        let glyphs = placements.iter().zip(slider.markers()).map(|(p, marker)| {
            let label = if marker.kind.shows_value(marker.value) {
                format!("{} {}", marker.kind.glyph(), marker.value)
            } else {
                marker.kind.glyph().to_string()
            };
            let style = ("sans-serif", font_size)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center));
            Text::new(label, (p.x + pan + p.width / 2.0, p.y + p.height / 2.0), style)
        });
        report(chart.draw_series(glyphs), "marker glyphs");
    }

    fn draw_scrubber<DB: DrawingBackend>(&self, chart: &mut ChartContext<'_, DB, Face>, scale: f64) {
        let frame = self.state.slider().frame();
        let color = to_plotters(frame.color.unwrap_or_else(|| self.state.accent()));
        let x = frame.viewport_x.0;

        let mut dashes = Vec::new();
        let mut y = frame.guide.y1;
        while y < frame.guide.y2 {
            let end = (y + GUIDE_DASH).min(frame.guide.y2);
            dashes.push(PathElement::new(vec![(x, y), (x, end)], color.mix(0.8).stroke_width(1)));
            y += GUIDE_DASH * 2.0;
        }
        report(chart.draw_series(dashes), "guide");

        let radius = (6.0 * scale).round() as i32;
        report(
            chart.draw_series([
                Circle::new((x, frame.y), radius + 2, BLACK.filled()),
                Circle::new((x, frame.y), radius, color.filled()),
            ]),
            "dot",
        );

        let (badge_w, badge_h, offset) = frame.label.badge_size();
        let top = frame.label_y - offset;
        report(
            chart.draw_series([Rect::new(
                [(x - badge_w / 2.0, top), (x + badge_w / 2.0, top + badge_h)],
                LABEL_BADGE.filled(),
            )]),
            "label badge",
        );

        let font_size = (10.0 * scale).round();
        let style = ("sans-serif", font_size)
            .into_font()
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Center));
        let mut lines = vec![Text::new(frame.label.line1.clone(), (x, top + 7.0), style.clone())];
        if frame.label.is_two_line() {
            lines.push(Text::new(frame.label.line2.clone(), (x, top + 17.0), style));
        }
        report(chart.draw_series(lines), "time label");
    }

    fn draw_readouts<DB: DrawingBackend>(&self, chart: &mut ChartContext<'_, DB, Face>, scale: f64) {
        let frame = self.state.slider().frame();
        let clock = chrono::Local::now().format("%H:%M").to_string();
        let clock_style = ("sans-serif", (22.0 * scale).round())
            .into_font()
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Center));

        let reading = format!("{} {}", format_glucose(frame.glucose), frame.trend.arrow());
        let reading_color = to_plotters(frame.color.unwrap_or_else(|| self.state.accent()));
        let reading_style = ("sans-serif", (20.0 * scale).round())
            .into_font()
            .color(&reading_color)
            .pos(Pos::new(HPos::Center, VPos::Center));

        report(
            chart.draw_series([
                Text::new(clock, (FACE_SIZE / 2.0, CLOCK_Y), clock_style),
                Text::new(reading, (FACE_SIZE / 2.0, READING_Y), reading_style),
            ]),
            "readouts",
        );
    }
}

impl<'a> Chart<Message> for GlucoseChart<'a> {
    type State = PointerState;

    fn build_chart<DB: DrawingBackend>(&self, _state: &Self::State, mut builder: ChartBuilder<DB>) {
        let mut chart = match builder
            .margin(0)
            .x_label_area_size(0)
            .y_label_area_size(0)
            .build_cartesian_2d(0f64..FACE_SIZE, FACE_SIZE..0f64)
        {
            Ok(chart) => chart,
            Err(e) => {
                warn!("Failed to build face chart: {:?}", e);
                return;
            }
        };

        report(chart.plotting_area().fill(&BLACK), "background");

        let scale = f64::from(chart.plotting_area().dim_in_pixel().0) / FACE_SIZE;

        self.draw_boundaries(&mut chart);
        self.draw_curve(&mut chart, scale);
        self.draw_markers(&mut chart, scale);
        self.draw_scrubber(&mut chart, scale);
        self.draw_readouts(&mut chart, scale);
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    let (x, y) = to_face(bounds, position.x, position.y);
                    state.press(x);
                    return (event::Status::Captured, Some(Message::PointerPressed { x, y }));
                }
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { position }) if state.pressed => {
                let (x, _) = absolute_to_face(bounds, position);
                state.last_x = x;
                return (event::Status::Captured, Some(Message::PointerMoved { x }));
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) if state.pressed => {
                let x = state.release(cursor.position().map(|position| absolute_to_face(bounds, position).0));
                return (event::Status::Captured, Some(Message::PointerReleased { x }));
            }
            canvas::Event::Touch(touch::Event::FingerPressed { position, .. }) if bounds.contains(position) => {
                let (x, y) = absolute_to_face(bounds, position);
                state.press(x);
                return (event::Status::Captured, Some(Message::PointerPressed { x, y }));
            }
            canvas::Event::Touch(touch::Event::FingerMoved { position, .. }) if state.pressed => {
                let (x, _) = absolute_to_face(bounds, position);
                state.last_x = x;
                return (event::Status::Captured, Some(Message::PointerMoved { x }));
            }
            canvas::Event::Touch(
                touch::Event::FingerLifted { position, .. } | touch::Event::FingerLost { position, .. },
            ) if state.pressed => {
                let x = state.release(Some(absolute_to_face(bounds, position).0));
                return (event::Status::Captured, Some(Message::PointerReleased { x }));
            }
            _ => {}
        }
        (event::Status::Ignored, None)
    }

    fn mouse_interaction(&self, state: &Self::State, bounds: Rectangle, cursor: mouse::Cursor) -> mouse::Interaction {
        if state.pressed {
            return mouse::Interaction::Grabbing;
        }
        match cursor.position_in(bounds) {
            Some(position) => {
                let (x, y) = to_face(bounds, position.x, position.y);
                if self.state.slider().hits_handle(ViewportX(x), y) {
                    mouse::Interaction::Grab
                } else {
                    mouse::Interaction::Pointer
                }
            }
            None => mouse::Interaction::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_to_face_scaling() {
        let bounds = Rectangle::new(iced::Point::new(10.0, 20.0), iced::Size::new(378.0, 378.0));
        assert_eq!(to_face(bounds, 189.0, 0.0), (126.0, 0.0));
        assert_eq!(absolute_to_face(bounds, iced::Point::new(10.0 + 378.0, 20.0 + 189.0)), (252.0, 126.0));
    }

    #[test]
    fn test_release_off_window_uses_last_position() {
        let mut state = PointerState::default();
        state.press(140.0);
        assert_eq!(state.release(None), 140.0);
        assert!(!state.pressed);

        state.press(60.0);
        state.last_x = 75.0;
        assert_eq!(state.release(None), 75.0);
        assert_eq!(state.release(Some(12.0)), 12.0);
    }

    #[test]
    fn test_zone_colors_convert() {
        assert_eq!(to_plotters(Rgb::SAFE), RGBColor(0x7E, 0xD3, 0x21));
    }
}
