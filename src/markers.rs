//! # Context Markers Module
//!
//! Meal, insulin, activity and medication events pinned to the graph at the
//! moment they were logged, drawn as small badges stacked above and below the
//! current glucose point.
//!
//! ## Layout Rules
//! - Badges never overlap the glucose point: the nearest one above sits
//!   `first_gap` over it, the nearest one below `glucose_gap` under it
//!   (`first_gap` when nothing is above)
//! - Consecutive badges on a side keep at least `min_gap` between them
//! - Half the badges (rounded up) go above, the rest below; a full side hands
//!   its surplus to the other, and whatever still does not fit keeps stacking
//!   past the margin on the roomier side

use chrono::{DateTime, Utc};

use crate::zones::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Meal,
    Insulin,
    Activity,
    Med,
}

impl MarkerKind {
    /// Short badge glyph for the chart
    pub fn glyph(self) -> &'static str {
        match self {
            MarkerKind::Meal => "M",
            MarkerKind::Insulin => "I",
            MarkerKind::Activity => "A",
            MarkerKind::Med => "Rx",
        }
    }

    /// Whether the badge shows a dose next to its icon
    pub fn shows_value(self, value: u32) -> bool {
        matches!(self, MarkerKind::Insulin | MarkerKind::Med) && value > 1
    }
}

/// A logged event, fixed to the curve point where it was added
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMarker {
    pub kind: MarkerKind,
    pub value: u32,
    pub x: f64,
    pub y: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Above,
    Below,
}

/// Where one badge and its connector go
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPlacement {
    pub side: Side,
    /// Badge top-left
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Connector from the curve point to the nearest badge edge
    pub line_x: f64,
    pub line_from_y: f64,
    pub line_to_y: f64,
}

/// Spacing rules for the badge stack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerLayout {
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub badge_size: f64,
    pub wide_badge: f64,
    pub min_gap: f64,
    pub first_gap: f64,
    pub glucose_gap: f64,
}

impl Default for MarkerLayout {
    fn default() -> Self {
        Self {
            top_margin: 55.0,
            bottom_margin: 170.0,
            badge_size: 20.0,
            wide_badge: 36.0,
            min_gap: 15.0,
            first_gap: 40.0,
            glucose_gap: 15.0,
        }
    }
}

impl MarkerLayout {
    fn pitch(&self) -> f64 {
        self.badge_size + self.min_gap
    }

    fn first_above(&self, glucose_y: f64) -> f64 {
        glucose_y - self.first_gap - self.badge_size
    }

    fn first_below(&self, glucose_y: f64, any_above: bool) -> f64 {
        if any_above {
            glucose_y + self.glucose_gap
        } else {
            glucose_y + self.first_gap
        }
    }

    fn capacity_above(&self, glucose_y: f64) -> usize {
        let first = self.first_above(glucose_y);
        if first < self.top_margin {
            0
        } else {
            ((first - self.top_margin) / self.pitch()).floor() as usize + 1
        }
    }

    fn capacity_below(&self, glucose_y: f64, any_above: bool) -> usize {
        let first = self.first_below(glucose_y, any_above);
        let last_top = self.bottom_margin - self.badge_size;
        if first > last_top {
            0
        } else {
            ((last_top - first) / self.pitch()).floor() as usize + 1
        }
    }

    /// Badge top positions `(above, below)`, nearest the glucose point first
    pub fn stack(&self, count: usize, glucose_y: f64) -> (Vec<f64>, Vec<f64>) {
        let cap_above = self.capacity_above(glucose_y);

        let mut above = count.div_ceil(2).min(cap_above);
        let mut below = (count - above).min(self.capacity_below(glucose_y, above > 0));
        if above + below < count {
            above = (count - below).min(cap_above);
        }

        let overflow = count - above - below;
        if overflow > 0 {
            let room_above = self.first_above(glucose_y) - self.top_margin;
            let room_below = self.bottom_margin - self.badge_size - self.first_below(glucose_y, above > 0);
            if room_above >= room_below {
                above += overflow;
            } else {
                below += overflow;
            }
        }

        let first_above = self.first_above(glucose_y);
        let above_tops = (0..above).map(|i| first_above - i as f64 * self.pitch()).collect();

        let first_below = self.first_below(glucose_y, above > 0);
        let below_tops = (0..below).map(|i| first_below + i as f64 * self.pitch()).collect();

        (above_tops, below_tops)
    }

    /// Place every marker's badge around the glucose point at `glucose_y`
    pub fn layout(&self, markers: &[ContextMarker], glucose_y: f64) -> Vec<MarkerPlacement> {
        let (above, below) = self.stack(markers.len(), glucose_y);
        let slots = above
            .into_iter()
            .map(|y| (Side::Above, y))
            .chain(below.into_iter().map(|y| (Side::Below, y)));

        markers
            .iter()
            .zip(slots)
            .map(|(marker, (side, top))| {
                let width = if marker.kind.shows_value(marker.value) {
                    self.wide_badge
                } else {
                    self.badge_size
                };
                let line_to_y = if top < marker.y { top + self.badge_size } else { top };
                MarkerPlacement {
                    side,
                    x: marker.x - width / 2.0,
                    y: top,
                    width,
                    height: self.badge_size,
                    line_x: marker.x,
                    line_from_y: marker.y,
                    line_to_y,
                }
            })
            .collect()
    }
}

/// Badge and connector color: the live accent at "now", grey in history
pub fn marker_color(at_now: bool, accent: Rgb) -> Rgb {
    if at_now {
        accent
    } else {
        Rgb::NEUTRAL_GREY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(kind: MarkerKind, value: u32, y: f64) -> ContextMarker {
        ContextMarker { kind, value, x: 206.0, y, timestamp: Utc::now() }
    }

    fn assert_well_placed(layout: &MarkerLayout, placements: &[MarkerPlacement], glucose_y: f64) {
        for p in placements {
            let straddles = p.y < glucose_y && p.y + p.height > glucose_y;
            assert!(!straddles, "badge at {} straddles glucose y {}", p.y, glucose_y);
        }
        let mut tops: Vec<f64> = placements.iter().map(|p| p.y).collect();
        tops.sort_by(|a, b| a.total_cmp(b));
        for pair in tops.windows(2) {
            assert!(pair[1] - (pair[0] + layout.badge_size) >= layout.min_gap - 1e-9);
        }
    }

    #[test]
    fn test_five_markers_added_in_sequence() {
        let layout = MarkerLayout::default();
        for glucose_y in [60.0, 96.0, 125.0, 150.0, 190.0] {
            let mut markers = Vec::new();
            for kind in [MarkerKind::Meal, MarkerKind::Insulin, MarkerKind::Activity, MarkerKind::Med, MarkerKind::Meal] {
                markers.push(marker(kind, 4, glucose_y));
                let placements = layout.layout(&markers, glucose_y);
                assert_eq!(placements.len(), markers.len());
                assert_well_placed(&layout, &placements, glucose_y);
            }
        }
    }

    #[test]
    fn test_first_marker_goes_above() {
        let layout = MarkerLayout::default();
        let placements = layout.layout(&[marker(MarkerKind::Meal, 1, 140.0)], 140.0);
        assert_eq!(placements[0].side, Side::Above);
        assert_eq!(placements[0].y, 80.0);
        assert_eq!(placements[0].line_to_y, 100.0);
    }

    #[test]
    fn test_no_room_above_uses_below() {
        let layout = MarkerLayout::default();
        let placements = layout.layout(&[marker(MarkerKind::Meal, 1, 80.0)], 80.0);
        assert_eq!(placements[0].side, Side::Below);
        assert_eq!(placements[0].y, 120.0);
        assert_eq!(placements[0].line_to_y, 120.0);
    }

    #[test]
    fn test_split_between_sides() {
        let layout = MarkerLayout::default();
        assert_eq!(layout.stack(2, 125.0), (vec![65.0], vec![140.0]));
        // third badge fits nowhere, so it stacks past the top margin
        assert_eq!(layout.stack(3, 125.0), (vec![65.0, 30.0], vec![140.0]));
        // below is full at 140, everything goes up
        assert_eq!(layout.stack(3, 140.0), (vec![80.0, 45.0, 10.0], vec![]));
        assert_eq!(layout.stack(0, 140.0), (vec![], vec![]));
    }

    #[test]
    fn test_wide_badge_for_doses() {
        let layout = MarkerLayout::default();
        let placements = layout.layout(
            &[marker(MarkerKind::Insulin, 6, 140.0), marker(MarkerKind::Med, 1, 140.0)],
            140.0,
        );
        assert_eq!(placements[0].width, 36.0);
        assert_eq!(placements[0].x, 188.0);
        assert_eq!(placements[1].width, 20.0);
    }

    #[test]
    fn test_marker_color() {
        assert_eq!(marker_color(true, Rgb::DANGER), Rgb::DANGER);
        assert_eq!(marker_color(false, Rgb::DANGER), Rgb::NEUTRAL_GREY);
    }
}
