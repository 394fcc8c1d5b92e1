//! # Graph Slider Module
//!
//! The time scrubber on the glucose graph. Owns the sampled curve, the scrub
//! position, the history pan offset and the springs animating them, and turns
//! every position change into a `SliderFrame` for the display to draw.
//!
//! ## Coordinate Spaces
//! - `GraphX`: position along the glucose line (history is negative, now is 206)
//! - `ViewportX`: position on the watch face; `viewport = graph + pan_offset`
//!
//! Pointer input arrives in viewport space; curve lookups happen in graph space.
//!
//! ## Gestures
//! ```text
//!   Idle --press on handle-------> Dragging --release--> Idle
//!   Idle --click on curve--------> Animating --settled--> Idle
//!   Idle --press on background---> Panning --release--> Idle (snap back under 30%)
//! ```
//! Dragging writes the position directly every move; clicking hands the
//! target to a spring. A click right after a pan is swallowed.
//!
//! ## Color Hand-off
//! Within 5 px of now the slider leaves color to the live glucose pipeline so
//! the blob, reading and graph fade together; further back it colors the
//! dot, guide and highlight itself from the zone under the scrub point.

use std::time::Instant;

use chrono::Utc;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;

use crate::curve::{Calibration, CubicPath, Curve, Point};
use crate::face::{line_bounds_for_x, LineBounds};
use crate::fuzzy_time::{fuzzy_time, minutes_ago, FuzzyTime, Language};
use crate::markers::{ContextMarker, MarkerKind};
use crate::spring::{Spring, SpringConfig, SpringStep};
use crate::synth::{self, HISTORY_START_X, NOW_X};
use crate::trend::Trend;
use crate::zones::{
    build_segments, color_for_glucose, find_crossings, segment_for_x, Rgb, Segment, Zone, ZoneBoundaries,
};

/// Pixel y and mmol/L of the high and low calibration anchors
const HIGH_ANCHOR: (f64, f64) = (96.0, 10.0);
const LOW_ANCHOR: (f64, f64) = (156.0, 4.0);

/// Leftmost viewport x the scrub handle may reach (middle of the left button)
const MIN_VIEWPORT_X: f64 = 28.0;

/// How far the graph can be dragged right to reveal history
pub const MAX_PAN_OFFSET: f64 = 200.0;

/// Releasing a pan below this fraction of the max snaps it back to zero
const PAN_SNAP_FRACTION: f64 = 0.3;

/// Pan distance that counts as a real pan (and swallows the next click)
const PAN_MOVE_THRESHOLD: f64 = 5.0;

/// Distance from now that still counts as "now"
const NOW_TOLERANCE: f64 = 5.0;

const CURRENT_SAMPLES: usize = 200;
const COMBINED_SAMPLES: usize = 300;

/// Half-width of the window used to estimate the trend slope
const SLOPE_DELTA: f64 = 8.0;

/// Horizontal reach of the invisible hitbox around the guide line
const HANDLE_HIT_RADIUS: f64 = 12.0;

/// Reading range for regenerated curves, about 11 down to 3 mmol/L
const REGENERATE_END_Y: std::ops::Range<f64> = 86.0..166.0;

const LABEL_DEFAULT_Y: f64 = 172.0;
const LABEL_MAX_Y: f64 = 210.0;
const LABEL_CLEARANCE: f64 = 8.0;
const LABEL_SCAN_RADIUS: f64 = 25.0;
const LABEL_SCAN_STEP: f64 = 3.0;

/// Position along the glucose line
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct GraphX(pub f64);

/// Position on the watch face
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ViewportX(pub f64);

impl GraphX {
    pub fn to_viewport(self, pan_offset: f64) -> ViewportX {
        ViewportX(self.0 + pan_offset)
    }
}

impl ViewportX {
    pub fn to_graph(self, pan_offset: f64) -> GraphX {
        GraphX(self.0 - pan_offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubState {
    Idle,
    Dragging,
    Animating,
    Panning,
}

/// Highlight clip: x from the active segment, y from the active zone band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ClipRect {
    fn for_segment(segment: &Segment, (band_top, band_height): (f64, f64)) -> Self {
        let start = segment.start_x.floor() - 2.0;
        let end = segment.end_x.ceil() + 3.0;
        Self {
            x: start,
            y: band_top,
            width: end - start,
            height: band_height,
        }
    }
}

/// Everything the display needs after a position change
#[derive(Debug, Clone, PartialEq)]
pub struct SliderFrame {
    pub graph_x: GraphX,
    pub viewport_x: ViewportX,
    /// Curve y under the scrub point
    pub y: f64,
    pub glucose: f64,
    /// Reading color for `glucose`, always computed
    pub glucose_color: Rgb,
    pub trend: Trend,
    pub zone: Zone,
    pub at_now: bool,
    /// Scrub color, `None` at now where the live pipeline owns color
    pub color: Option<Rgb>,
    pub clip: Option<ClipRect>,
    pub guide: LineBounds,
    pub label: FuzzyTime,
    pub label_y: f64,
}

struct PanGesture {
    start_pointer: f64,
    start_offset: f64,
}

/// One generation of the glucose line
struct GraphData {
    current_path: CubicPath,
    combined: Curve,
    segments: Vec<Segment>,
}

impl GraphData {
    fn build(path: CubicPath, boundaries: &ZoneBoundaries, rng: &mut StdRng) -> Option<Self> {
        let current = Curve::from_path(&path, CURRENT_SAMPLES)?;

        let combined = synth::synthesize_history(current.samples(), rng)
            .and_then(|history| Curve::from_path(&history, COMBINED_SAMPLES))
            .unwrap_or_else(|| current.clone());

        let crossings = find_crossings(combined.samples(), boundaries);
        let segments = build_segments(combined.samples(), &crossings, boundaries);

        Some(Self {
            current_path: path,
            combined,
            segments,
        })
    }

    /// Flat line used when the requested curve is unusable
    fn flat(y: f64, boundaries: &ZoneBoundaries, rng: &mut StdRng) -> Self {
        let mut path = CubicPath::new(Point::new(synth::CURRENT_START_X, y));
        path.line_to(Point::new(NOW_X, y));
        Self::build(path.clone(), boundaries, rng).unwrap_or_else(|| {
            let combined = Curve::flat(synth::CURRENT_START_X, NOW_X, y);
            Self {
                current_path: path,
                segments: build_segments(combined.samples(), &[], boundaries),
                combined,
            }
        })
    }
}

pub struct GraphSlider {
    calibration: Calibration,
    boundaries: ZoneBoundaries,
    data: GraphData,
    dot_spring: Spring,
    pan_spring: Spring,
    pan_offset: f64,
    graph_x: GraphX,
    state: ScrubState,
    pan: Option<PanGesture>,
    pan_moved: bool,
    markers: Vec<ContextMarker>,
    language: Language,
    rng: StdRng,
    frame: SliderFrame,
}

impl GraphSlider {
    /// Build the slider on `path`, parked at now.
    ///
    /// A degenerate `path` is replaced by a flat line at 6.0 mmol/L.
    pub fn new(path: CubicPath, language: Language, mut rng: StdRng) -> Self {
        let calibration = Calibration::from_anchors(HIGH_ANCHOR, LOW_ANCHOR).unwrap_or_default();
        let boundaries = ZoneBoundaries::default();

        let data = match GraphData::build(path, &boundaries, &mut rng) {
            Some(data) => data,
            None => {
                warn!("Initial graph path is degenerate, using a flat line");
                GraphData::flat(calibration.glucose_to_y(6.0), &boundaries, &mut rng)
            }
        };

        let graph_x = GraphX(NOW_X);
        let frame = Self::placeholder_frame(graph_x);

        let mut slider = Self {
            calibration,
            boundaries,
            data,
            dot_spring: Spring::new(SpringConfig::FAST, NOW_X),
            pan_spring: Spring::new(SpringConfig::STANDARD, 0.0),
            pan_offset: 0.0,
            graph_x,
            state: ScrubState::Idle,
            pan: None,
            pan_moved: false,
            markers: Vec::new(),
            language,
            rng,
            frame,
        };
        slider.render_at(graph_x);
        slider
    }

    fn placeholder_frame(graph_x: GraphX) -> SliderFrame {
        SliderFrame {
            graph_x,
            viewport_x: graph_x.to_viewport(0.0),
            y: 0.0,
            glucose: 0.0,
            glucose_color: Rgb::SAFE,
            trend: Trend::Stable,
            zone: Zone::Safe,
            at_now: true,
            color: None,
            clip: None,
            guide: line_bounds_for_x(graph_x.0),
            label: fuzzy_time(0.0, Language::En),
            label_y: LABEL_DEFAULT_Y,
        }
    }

    pub fn frame(&self) -> &SliderFrame {
        &self.frame
    }

    pub fn state(&self) -> ScrubState {
        self.state
    }

    pub fn pan_offset(&self) -> f64 {
        self.pan_offset
    }

    pub fn curve(&self) -> &Curve {
        &self.data.combined
    }

    pub fn current_path(&self) -> &CubicPath {
        &self.data.current_path
    }

    pub fn segments(&self) -> &[Segment] {
        &self.data.segments
    }

    pub fn boundaries(&self) -> &ZoneBoundaries {
        &self.boundaries
    }

    pub fn markers(&self) -> &[ContextMarker] {
        &self.markers
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.frame = self.compute_frame();
    }

    pub fn glucose_to_y(&self, glucose: f64) -> f64 {
        self.calibration.glucose_to_y(glucose)
    }

    pub fn y_to_glucose(&self, y: f64) -> f64 {
        self.calibration.y_to_glucose(y)
    }

    /// Curve y at now, where the live reading sits
    pub fn now_y(&self) -> f64 {
        self.data.combined.y_at(NOW_X)
    }

    pub fn now_glucose(&self) -> f64 {
        self.y_to_glucose(self.now_y())
    }

    pub fn now_trend(&self) -> Trend {
        self.trend_at(NOW_X)
    }

    /// Move the scrub point, directly when `immediate`, otherwise by spring
    pub fn update_slider_position(&mut self, x: GraphX, immediate: bool) {
        if immediate {
            self.render_at(x);
            self.halt_dot();
        } else {
            self.animate_to(x);
        }
    }

    fn animate_to(&mut self, x: GraphX) {
        let target = self.clamp_graph_x(x.0);
        self.dot_spring.set_target(target);
        if self.dot_spring.is_animating() {
            self.state = ScrubState::Animating;
        } else {
            self.render_at(GraphX(target));
        }
    }

    /// Whether a press at this face position grabs the scrub handle
    pub fn hits_handle(&self, at: ViewportX, y: f64) -> bool {
        let guide = &self.frame.guide;
        (at.0 - self.frame.viewport_x.0).abs() <= HANDLE_HIT_RADIUS && y >= guide.y1 && y <= guide.y2
    }

    pub fn pointer_down(&mut self, at: ViewportX, on_handle: bool) {
        if on_handle {
            self.halt_dot();
            self.state = ScrubState::Dragging;
            debug!("Scrub drag started at {:.1}", at.0);
            return;
        }
        if self.state == ScrubState::Dragging {
            return;
        }

        self.halt_dot();
        self.pan_spring.stop();
        self.pan = Some(PanGesture {
            start_pointer: at.0,
            start_offset: self.pan_offset,
        });
        self.pan_moved = false;
        self.state = ScrubState::Panning;
        debug!("Pan started at {:.1} (offset {:.1})", at.0, self.pan_offset);
    }

    /// Park the dot where it is drawn, dropping any leftover momentum
    fn halt_dot(&mut self) {
        self.dot_spring.stop();
        self.dot_spring.set_value(self.graph_x.0);
        if self.state == ScrubState::Animating {
            self.state = ScrubState::Idle;
        }
    }

    pub fn pointer_move(&mut self, at: ViewportX) {
        match self.state {
            ScrubState::Dragging => {
                let x = at.to_graph(self.pan_offset);
                self.update_slider_position(x, true);
            }
            ScrubState::Panning => {
                let Some(gesture) = self.pan.as_ref() else {
                    return;
                };
                let delta = at.0 - gesture.start_pointer;
                if delta.abs() > PAN_MOVE_THRESHOLD {
                    self.pan_moved = true;
                }
                self.pan_offset = (gesture.start_offset + delta).clamp(0.0, MAX_PAN_OFFSET);
                self.frame = self.compute_frame();
            }
            ScrubState::Idle | ScrubState::Animating => {}
        }
    }

    pub fn pointer_up(&mut self) {
        match self.state {
            ScrubState::Dragging => {
                self.state = ScrubState::Idle;
                debug!(
                    "Scrub drag released at {:.1} in the {} zone",
                    self.graph_x.0,
                    self.frame.zone.name()
                );
            }
            ScrubState::Panning => {
                self.state = ScrubState::Idle;
                self.pan = None;
                if self.pan_offset < MAX_PAN_OFFSET * PAN_SNAP_FRACTION {
                    self.pan_spring.set_value(self.pan_offset);
                    self.pan_spring.set_target(0.0);
                }
                debug!("Pan released at offset {:.1}", self.pan_offset);
            }
            ScrubState::Idle | ScrubState::Animating => {}
        }
    }

    /// Click on the face away from the handle: glide the scrub point there
    pub fn click(&mut self, at: ViewportX) {
        if self.state == ScrubState::Dragging {
            return;
        }
        if self.pan_moved {
            self.pan_moved = false;
            debug!("Click after pan ignored");
            return;
        }
        let x = at.to_graph(self.pan_offset);
        self.update_slider_position(x, false);
    }

    /// Advance both springs to `now`. Returns whether anything moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        let dot = self.dot_spring.tick(now);
        let pan = self.pan_spring.tick(now);
        self.apply_steps(dot, pan)
    }

    /// Advance both springs by a fixed `dt` in seconds
    pub fn advance(&mut self, dt: f64) -> bool {
        let dot = self.dot_spring.step(dt);
        let pan = self.pan_spring.step(dt);
        self.apply_steps(dot, pan)
    }

    fn apply_steps(&mut self, dot: Option<SpringStep>, pan: Option<SpringStep>) -> bool {
        if let Some(step) = pan {
            self.pan_offset = step.value.clamp(0.0, MAX_PAN_OFFSET);
        }
        match dot {
            Some(step) => {
                self.render_at(GraphX(step.value));
                if step.completed && self.state == ScrubState::Animating {
                    self.state = ScrubState::Idle;
                }
            }
            None if pan.is_some() => self.frame = self.compute_frame(),
            None => {}
        }
        dot.is_some() || pan.is_some()
    }

    /// Back to now: no animation, no pan, live coloring
    pub fn reset(&mut self) {
        self.dot_spring.stop();
        self.dot_spring.set_value(NOW_X);
        self.pan_spring.stop();
        self.pan_spring.set_value(0.0);
        self.pan_offset = 0.0;
        self.pan = None;
        self.pan_moved = false;
        self.state = ScrubState::Idle;
        self.render_at(GraphX(NOW_X));
        info!("Graph slider reset to now");
    }

    /// Random current curve ending at `end_y`, approaching it along `trend`
    pub fn generate_random_path(&mut self, end_y: f64, trend: Option<Trend>) -> CubicPath {
        synth::generate_random_path(end_y, trend, &mut self.rng)
    }

    /// Fresh random curve ending at a random reading
    pub fn regenerate(&mut self, trend: Option<Trend>) -> bool {
        let end_y = self.rng.gen_range(REGENERATE_END_Y);
        let path = self.generate_random_path(end_y, trend);
        self.update_graph_path(path)
    }

    /// Replace the current curve, regenerating history and segments.
    ///
    /// Returns `false` and keeps the old curve when `path` is degenerate.
    pub fn update_graph_path(&mut self, path: CubicPath) -> bool {
        debug!("New graph path: {}", path.to_svg());
        match GraphData::build(path, &self.boundaries, &mut self.rng) {
            Some(data) => {
                self.data = data;
                info!(
                    "Graph regenerated: {} segments, now at {:.1} mmol/L",
                    self.data.segments.len(),
                    self.now_glucose()
                );
                self.render_at(self.graph_x);
                self.halt_dot();
                true
            }
            None => {
                warn!("Ignoring degenerate graph path");
                false
            }
        }
    }

    /// Log an event at now, pinned to the current end of the curve
    pub fn add_context_marker(&mut self, kind: MarkerKind, value: u32) {
        let marker = ContextMarker {
            kind,
            value,
            x: NOW_X,
            y: self.now_y(),
            timestamp: Utc::now(),
        };
        debug!("Context marker {:?} ({}) added", kind, value);
        self.markers.push(marker);
    }

    pub fn clear_context_markers(&mut self) {
        self.markers.clear();
    }

    fn clamp_graph_x(&self, x: f64) -> f64 {
        let curve = &self.data.combined;
        let lo = curve.min_x().max(MIN_VIEWPORT_X - self.pan_offset);
        let hi = curve.max_x().min(NOW_X - self.pan_offset);
        x.min(hi).max(lo)
    }

    fn render_at(&mut self, x: GraphX) {
        self.graph_x = GraphX(self.clamp_graph_x(x.0));
        self.frame = self.compute_frame();
    }

    fn trend_at(&self, x: f64) -> Trend {
        let curve = &self.data.combined;
        let x1 = (x - SLOPE_DELTA).max(curve.min_x());
        let x2 = (x + SLOPE_DELTA).min(curve.max_x());
        if x2 <= x1 {
            return Trend::Stable;
        }
        let slope = (curve.y_at(x2) - curve.y_at(x1)) / (x2 - x1);
        Trend::from_slope(slope)
    }

    /// Label baseline: below the curve's lowest nearby point, else the default row
    fn label_y_near(&self, x: f64, y: f64) -> f64 {
        let curve = &self.data.combined;
        let end = (x + LABEL_SCAN_RADIUS).min(curve.max_x());
        let mut sample_x = (x - LABEL_SCAN_RADIUS).max(curve.min_x());
        let mut lowest = y;
        while sample_x <= end {
            lowest = lowest.max(curve.y_at(sample_x));
            sample_x += LABEL_SCAN_STEP;
        }

        let min_text_y = lowest + LABEL_CLEARANCE;
        let text_y = if min_text_y > LABEL_DEFAULT_Y - 5.0 {
            min_text_y + 5.0
        } else {
            LABEL_DEFAULT_Y
        };
        text_y.min(LABEL_MAX_Y)
    }

    fn compute_frame(&self) -> SliderFrame {
        let x = self.graph_x.0;
        let y = self.data.combined.y_at(x);
        let viewport_x = self.graph_x.to_viewport(self.pan_offset);
        let at_now = (x - NOW_X).abs() < NOW_TOLERANCE;
        let glucose = self.calibration.y_to_glucose(y);

        let clip = segment_for_x(&self.data.segments, x)
            .map(|segment| ClipRect::for_segment(segment, self.boundaries.clip_band_for_y(y)));

        SliderFrame {
            graph_x: self.graph_x,
            viewport_x,
            y,
            glucose,
            glucose_color: color_for_glucose(glucose),
            trend: self.trend_at(x),
            zone: self.boundaries.zone_for_y(y),
            at_now,
            color: if at_now { None } else { Some(self.boundaries.color_for_y(y)) },
            clip,
            guide: line_bounds_for_x(viewport_x.0),
            label: fuzzy_time(minutes_ago(NOW_X - x, NOW_X - HISTORY_START_X), self.language),
            label_y: self.label_y_near(x, y),
        }
    }
}
