//! Round watch-face geometry used to keep the scrub guide line clear of the
//! clock text at the top and the glucose reading at the bottom.

/// Center of the 252 x 252 face
const CENTER: f64 = 126.0;

/// Radius of the arc the clock and reading are laid out on
const ARC_RADIUS: f64 = 111.0;

const FACE_TOP: f64 = 0.0;
const FACE_BOTTOM: f64 = 252.0;

/// How far outside a text region the line starts to shorten
const TRANSITION_WIDTH: f64 = 8.0;

/// Base clearance between line end and text
const TEXT_MARGIN: f64 = 12.0;

const CLOCK_TEXT: (f64, f64) = (105.0, 147.0);
const READING_TEXT: (f64, f64) = (115.0, 158.0);

/// Vertical extent of the dashed scrub guide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineBounds {
    pub y1: f64,
    pub y2: f64,
}

fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Eased 0..1 weight: 0 outside the region plus transition, 1 inside it
fn avoidance_weight(x: f64, (min_x, max_x): (f64, f64)) -> Option<f64> {
    if x < min_x - TRANSITION_WIDTH || x > max_x + TRANSITION_WIDTH {
        None
    } else if x < min_x {
        Some(smoothstep((x - (min_x - TRANSITION_WIDTH)) / TRANSITION_WIDTH))
    } else if x > max_x {
        Some(smoothstep((max_x + TRANSITION_WIDTH - x) / TRANSITION_WIDTH))
    } else {
        Some(1.0)
    }
}

/// 1 at the face's vertical center line, fading to 0 at the region's half-width
fn center_factor(x: f64, (min_x, max_x): (f64, f64)) -> f64 {
    let max_dist = (max_x - min_x) / 2.0;
    1.0 - ((x - CENTER).abs() / max_dist).min(1.0)
}

/// Guide-line extent at viewport `x`. Edge to edge unless near the text
/// regions, where it follows the face arc with extra room toward the middle.
pub fn line_bounds_for_x(x: f64) -> LineBounds {
    let mut bounds = LineBounds { y1: FACE_TOP, y2: FACE_BOTTOM };

    let dx = x - CENTER;
    if dx.abs() >= ARC_RADIUS {
        return bounds;
    }
    let arc_offset = (ARC_RADIUS * ARC_RADIUS - dx * dx).sqrt();

    if let Some(weight) = avoidance_weight(x, CLOCK_TEXT) {
        let margin = TEXT_MARGIN + center_factor(x, CLOCK_TEXT) * 12.0;
        let target = CENTER - arc_offset + margin;
        bounds.y1 = FACE_TOP + weight * (target - FACE_TOP);
    }

    if let Some(weight) = avoidance_weight(x, READING_TEXT) {
        // +3 keeps the trend arrow clear
        let margin = TEXT_MARGIN + 3.0 + center_factor(x, READING_TEXT) * 15.0;
        let target = CENTER + arc_offset - margin;
        bounds.y2 = FACE_BOTTOM - weight * (FACE_BOTTOM - target);
    }

    bounds
}
