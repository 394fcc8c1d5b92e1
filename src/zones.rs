//! # Glucose Zones Module
//!
//! Classifies the glucose line into five clinical zones and colors it.
//!
//! ## Zones (pixel y, glucose)
//! ```text
//!   y <  96   danger-high   (> 10.0)
//!   y <= 106  warning-high  (9.0 - 10.0)
//!   y <  151  safe          (4.5 - 9.0)
//!   y <= 156  warning-low   (4.0 - 4.5)
//!   y >  156  danger-low    (< 4.0)
//! ```
//!
//! ## Segments
//! Walking the sampled curve for boundary crossings splits it into runs of a
//! single zone. The slider clips the highlighted line to the run under the
//! scrub position so only that stretch lights up in the zone color.
//!
//! ## Color Blending
//! Two 5 px bands (0.5 mmol/L) fade warning yellow into danger red:
//! y 96-101 on the high side and y 151-156 on the low side.

use crate::curve::{y_for_x, Sample};

/// Width of a warning-to-danger blend band in pixels
pub const BLEND_BAND_PX: f64 = 5.0;

/// Height of the watch face in display units
pub const FACE_SIZE: f64 = 252.0;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const SAFE: Rgb = Rgb::new(0x7E, 0xD3, 0x21);
    pub const WARNING: Rgb = Rgb::new(0xFF, 0xD7, 0x00);
    pub const DANGER: Rgb = Rgb::new(0xFF, 0x44, 0x44);
    pub const NEUTRAL_GREY: Rgb = Rgb::new(0x8E, 0x8E, 0x93);

    /// Channel-wise linear blend, `t = 0` is `self`, `t = 1` is `other`
    pub fn blend(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    DangerHigh,
    WarningHigh,
    Safe,
    WarningLow,
    DangerLow,
}

impl Zone {
    pub fn name(self) -> &'static str {
        match self {
            Zone::DangerHigh => "danger-high",
            Zone::WarningHigh => "warning-high",
            Zone::Safe => "safe",
            Zone::WarningLow => "warning-low",
            Zone::DangerLow => "danger-low",
        }
    }
}

/// Boundary lines a curve can cross
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    DangerHigh,
    WarningHigh,
    WarningLow,
    DangerLow,
}

/// Pixel y of each zone threshold, strictly increasing top to bottom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBoundaries {
    pub danger_high: f64,
    pub warning_high: f64,
    pub warning_low: f64,
    pub danger_low: f64,
}

impl Default for ZoneBoundaries {
    fn default() -> Self {
        Self {
            danger_high: 96.0,
            warning_high: 106.0,
            warning_low: 151.0,
            danger_low: 156.0,
        }
    }
}

impl ZoneBoundaries {
    pub fn lines(&self) -> [(f64, Boundary); 4] {
        [
            (self.danger_high, Boundary::DangerHigh),
            (self.warning_high, Boundary::WarningHigh),
            (self.warning_low, Boundary::WarningLow),
            (self.danger_low, Boundary::DangerLow),
        ]
    }

    pub fn zone_for_y(&self, y: f64) -> Zone {
        if y < self.danger_high {
            Zone::DangerHigh
        } else if y <= self.warning_high {
            Zone::WarningHigh
        } else if y < self.warning_low {
            Zone::Safe
        } else if y <= self.danger_low {
            Zone::WarningLow
        } else {
            Zone::DangerLow
        }
    }

    /// Vertical band `(top, height)` the highlight is clipped to for `y`
    pub fn clip_band_for_y(&self, y: f64) -> (f64, f64) {
        if y < self.danger_high {
            (0.0, self.danger_high)
        } else if y < self.warning_high {
            (self.danger_high, self.warning_high - self.danger_high)
        } else if y < self.warning_low {
            (self.warning_high, self.warning_low - self.warning_high)
        } else if y < self.danger_low {
            (self.warning_low, self.danger_low - self.warning_low)
        } else {
            (self.danger_low, FACE_SIZE - self.danger_low)
        }
    }

    /// Zone color with the warning-to-danger blend bands applied
    pub fn color_for_y(&self, y: f64) -> Rgb {
        let blend_high = self.danger_high + BLEND_BAND_PX;

        if y <= self.danger_high || y >= self.danger_low {
            return Rgb::DANGER;
        }
        if y >= self.warning_high && y <= self.warning_low {
            return Rgb::SAFE;
        }
        if y < self.warning_high {
            if y <= blend_high {
                let t = (blend_high - y) / BLEND_BAND_PX;
                return Rgb::WARNING.blend(Rgb::DANGER, t);
            }
            return Rgb::WARNING;
        }
        let t = (y - self.warning_low) / BLEND_BAND_PX;
        Rgb::WARNING.blend(Rgb::DANGER, t)
    }
}

/// Same blending as `color_for_y`, expressed in mmol/L
pub fn color_for_glucose(glucose: f64) -> Rgb {
    if glucose <= 4.0 || glucose >= 10.0 {
        return Rgb::DANGER;
    }
    if (4.5..=9.0).contains(&glucose) {
        return Rgb::SAFE;
    }
    if glucose > 9.0 {
        if glucose >= 9.5 {
            return Rgb::WARNING.blend(Rgb::DANGER, (glucose - 9.5) / 0.5);
        }
        return Rgb::WARNING;
    }
    Rgb::WARNING.blend(Rgb::DANGER, (4.5 - glucose) / 0.5)
}

/// Point where the curve crosses a boundary line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub x: f64,
    pub y: f64,
    pub boundary: Boundary,
}

/// Contiguous x-range of the curve lying in one zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start_x: f64,
    pub end_x: f64,
    pub zone: Zone,
}

impl Segment {
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start_x && x <= self.end_x
    }
}

/// All boundary crossings between consecutive samples, sorted by x
pub fn find_crossings(samples: &[Sample], boundaries: &ZoneBoundaries) -> Vec<Crossing> {
    let mut crossings = Vec::new();

    for pair in samples.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        for (line_y, boundary) in boundaries.lines() {
            let straddles = (prev.y < line_y && curr.y >= line_y) || (prev.y >= line_y && curr.y < line_y);
            if straddles {
                let t = (line_y - prev.y) / (curr.y - prev.y);
                crossings.push(Crossing {
                    x: prev.x + t * (curr.x - prev.x),
                    y: line_y,
                    boundary,
                });
            }
        }
    }

    crossings.sort_by(|a, b| a.x.total_cmp(&b.x));
    crossings
}

/// Split the curve's x-range at each crossing, tagging every run by the zone at its midpoint
pub fn build_segments(samples: &[Sample], crossings: &[Crossing], boundaries: &ZoneBoundaries) -> Vec<Segment> {
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return Vec::new();
    };

    let zone_between = |start: f64, end: f64| {
        let mid_y = y_for_x(samples, (start + end) / 2.0).unwrap_or(first.y);
        boundaries.zone_for_y(mid_y)
    };

    let mut segments = Vec::with_capacity(crossings.len() + 1);
    let mut last_x = first.x;

    for crossing in crossings {
        let end_x = crossing.x.clamp(last_x, last.x);
        segments.push(Segment {
            start_x: last_x,
            end_x,
            zone: zone_between(last_x, end_x),
        });
        last_x = end_x;
    }

    segments.push(Segment {
        start_x: last_x,
        end_x: last.x,
        zone: zone_between(last_x, last.x),
    });

    segments
}

/// Segment containing `x`, falling back to the last one
pub fn segment_for_x(segments: &[Segment], x: f64) -> Option<&Segment> {
    segments.iter().find(|s| s.contains(x)).or_else(|| segments.last())
}
