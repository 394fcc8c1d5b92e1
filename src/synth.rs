//! # Path Synthesis Module
//!
//! Procedural glucose lines for the demo: a random "current" curve ending at
//! the live reading, and a history stretch prepended to its left.
//!
//! ## Smoothness
//! Both are built as Catmull-Rom splines converted to cubic Bezier segments,
//! which keeps tangents continuous through every control point, including the
//! junction where history meets the current curve.
//!
//! ## Domain
//! ```text
//!   -200 ........ 0 ..................... 206
//!    history        current curve          now
//! ```

use crate::curve::{CubicPath, Point, Sample};
use crate::trend::Trend;
use rand::Rng;

/// x of the current reading
pub const NOW_X: f64 = 206.0;

/// x where the current curve starts and history ends
pub const CURRENT_START_X: f64 = 0.0;

/// Oldest x of the synthesized history
pub const HISTORY_START_X: f64 = -200.0;

/// Catmull-Rom tension (0.5 is the standard centripetal-free form)
const TENSION: f64 = 0.5;

/// Convert control points to a C¹-continuous cubic path
pub fn catmull_rom_to_bezier(points: &[Point]) -> Option<CubicPath> {
    if points.len() < 2 {
        return None;
    }

    let mut path = CubicPath::new(points[0]);
    let last = points.len() - 1;

    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];

        let c1 = Point::new(
            p1.x + (p2.x - p0.x) * TENSION / 3.0,
            p1.y + (p2.y - p0.y) * TENSION / 3.0,
        );
        let c2 = Point::new(
            p2.x - (p3.x - p1.x) * TENSION / 3.0,
            p2.y - (p3.y - p1.y) * TENSION / 3.0,
        );
        path.cubic_to(c1, c2, p2);
    }

    Some(path)
}

/// Random current curve from x = 0 to x = 206 ending exactly at `end_y`.
///
/// The first 70% wanders freely; the rest leans toward the end point along
/// the slope implied by `trend`, so the line arrives at the reading heading
/// the way the trend arrow points.
pub fn generate_random_path(end_y: f64, trend: Option<Trend>, rng: &mut impl Rng) -> CubicPath {
    let end_slope = trend.map(Trend::target_slope).unwrap_or(0.0);

    let start_y = rng.gen_range(70.0..170.0);
    let num_points: usize = rng.gen_range(4..=5);
    let mut points = vec![Point::new(CURRENT_START_X, start_y)];

    for i in 1..num_points {
        let progress = i as f64 / num_points as f64;
        let x = CURRENT_START_X + progress * (NOW_X - CURRENT_START_X);

        let y = if progress < 0.7 {
            rng.gen_range(60.0..190.0)
        } else {
            let remaining_x = NOW_X - x;
            let slope_bias = end_slope * remaining_x * 0.5;
            end_y + slope_bias + (rng.gen::<f64>() - 0.5) * 25.0
        };

        points.push(Point::new(x, y.clamp(50.0, 200.0)));
    }

    points.push(Point::new(NOW_X, end_y));

    // at least two points were pushed above
    catmull_rom_to_bezier(&points).unwrap_or_else(|| CubicPath::new(points[0]))
}

/// Prepend a freshly randomized history stretch to the sampled current curve.
///
/// The approach point at x = -20 is pulled toward the current start so the
/// join does not kink; the junction itself sits exactly on the current start.
/// Returns `None` when `current` is empty.
pub fn synthesize_history(current: &[Sample], rng: &mut impl Rng) -> Option<CubicPath> {
    let first = current.first()?;
    let main_start_y = first.y;

    let mut points = vec![
        Point::new(HISTORY_START_X, rng.gen_range(80.0..160.0)),
        Point::new(-160.0, rng.gen_range(60.0..160.0)),
        Point::new(-120.0, rng.gen_range(70.0..160.0)),
        Point::new(-80.0, rng.gen_range(60.0..160.0)),
        Point::new(-40.0, rng.gen_range(50.0..130.0)),
        Point::new(-20.0, main_start_y + (rng.gen::<f64>() - 0.5) * 30.0),
        Point::new(CURRENT_START_X, main_start_y),
    ];

    let stride = (current.len() / 8).max(1);
    let mut main_points: Vec<Point> = current.iter().step_by(stride).copied().collect();
    if let (Some(last_main), Some(last_sample)) = (main_points.last(), current.last()) {
        if last_main.x != last_sample.x {
            main_points.push(*last_sample);
        }
    }

    // first main point duplicates the junction
    points.extend(main_points.into_iter().skip(1));

    catmull_rom_to_bezier(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{sample_path, y_for_x};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_catmull_rom_passes_through_points() {
        let points = vec![Point::new(0.0, 10.0), Point::new(10.0, 30.0), Point::new(20.0, 5.0)];
        let path = catmull_rom_to_bezier(&points).unwrap();
        assert_eq!(path.start(), points[0]);
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.segments()[0].end, points[1]);
        assert_eq!(path.end(), points[2]);
        assert!(catmull_rom_to_bezier(&points[..1]).is_none());
    }

    #[test]
    fn test_catmull_rom_tangent_continuity() {
        let points = vec![
            Point::new(0.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(20.0, 5.0),
            Point::new(30.0, 12.0),
        ];
        let path = catmull_rom_to_bezier(&points).unwrap();
        for pair in path.segments().windows(2) {
            let joint = pair[0].end;
            let incoming = (joint.x - pair[0].c2.x, joint.y - pair[0].c2.y);
            let outgoing = (pair[1].c1.x - joint.x, pair[1].c1.y - joint.y);
            assert!((incoming.0 - outgoing.0).abs() < 1e-9);
            assert!((incoming.1 - outgoing.1).abs() < 1e-9);
        }
    }

    #[test]
    fn test_random_path_ends_at_reading() {
        let mut rng = StdRng::seed_from_u64(7);
        for trend in Trend::ALL {
            let path = generate_random_path(120.0, Some(trend), &mut rng);
            assert_eq!(path.start().x, CURRENT_START_X);
            assert_eq!(path.end(), Point::new(NOW_X, 120.0));
            assert!(path.segments().len() == 4 || path.segments().len() == 5);
        }
    }

    #[test]
    fn test_random_path_control_points_bounded() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let path = generate_random_path(100.0, None, &mut rng);
            assert!((70.0..170.0).contains(&path.start().y));
            for segment in &path.segments()[..path.segments().len() - 1] {
                assert!((50.0..=200.0).contains(&segment.end.y));
            }
        }
    }

    #[test]
    fn test_history_joins_current_curve() {
        let mut rng = StdRng::seed_from_u64(3);
        let current_path = generate_random_path(130.0, Some(Trend::Stable), &mut rng);
        let current = sample_path(&current_path, 200);

        let combined = synthesize_history(&current, &mut rng).unwrap();
        assert_eq!(combined.start().x, HISTORY_START_X);
        assert_eq!(combined.end(), *current.last().unwrap());

        let junction = combined
            .segments()
            .iter()
            .find(|s| s.end.x == CURRENT_START_X)
            .expect("junction point");
        assert_eq!(junction.end.y, current[0].y);

        let samples = sample_path(&combined, 300);
        let y_now = y_for_x(&samples, NOW_X).unwrap();
        assert!((y_now - 130.0).abs() < 1e-6);
    }

    #[test]
    fn test_history_is_regenerated() {
        let mut rng = StdRng::seed_from_u64(5);
        let current = sample_path(&generate_random_path(110.0, None, &mut rng), 200);
        let a = synthesize_history(&current, &mut rng).unwrap();
        let b = synthesize_history(&current, &mut rng).unwrap();
        assert_ne!(a.start(), b.start());
        assert!(synthesize_history(&[], &mut rng).is_none());
    }
}
