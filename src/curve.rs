//! # Curve Sampling Module
//!
//! Geometry for the glucose line: cubic Bezier paths, dense arc-length
//! sampling, and y-for-x lookup on the sampled table.
//!
//! ## Key Types
//! - `CubicPath`: A move-to followed by cubic segments (what SVG calls `M ... C ...`)
//! - `Curve`: Samples sorted by x, at least two of them
//! - `Calibration`: Affine mapping between pixel y and glucose (mmol/L)
//!
//! ## Why Arc Length
//! Equal parametric steps bunch up wherever the curve is steep. Stepping by
//! equal arc length keeps the lookup table evenly dense along the drawn line.

use crate::error::PathError;
use std::fmt::Write;

/// Parametric steps per cubic when measuring arc length
const FLATTEN_STEPS: usize = 32;

/// A point in local display coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// One point of a sampled curve
pub type Sample = Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub c1: Point,
    pub c2: Point,
    pub end: Point,
}

impl CubicSegment {
    fn point_at(&self, from: Point, t: f64) -> Point {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point {
            x: a * from.x + b * self.c1.x + c * self.c2.x + d * self.end.x,
            y: a * from.y + b * self.c1.y + c * self.c2.y + d * self.end.y,
        }
    }
}

/// Smooth path made of cubic Bezier segments
#[derive(Debug, Clone, PartialEq)]
pub struct CubicPath {
    start: Point,
    segments: Vec<CubicSegment>,
}

impl CubicPath {
    pub fn new(start: Point) -> Self {
        Self { start, segments: Vec::new() }
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, end: Point) {
        self.segments.push(CubicSegment { c1, c2, end });
    }

    /// Straight segment expressed as a cubic with control points on the line
    pub fn line_to(&mut self, end: Point) {
        let from = self.end();
        self.cubic_to(from.lerp(end, 1.0 / 3.0), from.lerp(end, 2.0 / 3.0), end);
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.segments.last().map(|s| s.end).unwrap_or(self.start)
    }

    pub fn segments(&self) -> &[CubicSegment] {
        &self.segments
    }

    /// Polyline approximation with `steps` points per segment
    pub fn flatten(&self, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        let mut points = Vec::with_capacity(self.segments.len() * steps + 1);
        points.push(self.start);

        let mut from = self.start;
        for segment in &self.segments {
            for i in 1..=steps {
                points.push(segment.point_at(from, i as f64 / steps as f64));
            }
            from = segment.end;
        }
        points
    }

    /// Parse absolute SVG path data using the M, L and C commands
    pub fn from_svg(data: &str) -> Result<Self, PathError> {
        let tokens = tokenize(data);
        let mut iter = tokens.iter().peekable();

        let mut path = match iter.next() {
            Some(Token::Command('M')) => {
                let start = read_point(&mut iter, 'M')?;
                CubicPath::new(start)
            }
            Some(Token::Command(c)) if !"MLC".contains(*c) => return Err(PathError::UnsupportedCommand(*c)),
            _ => return Err(PathError::MissingMoveTo),
        };

        let mut command = 'L';
        while let Some(token) = iter.peek() {
            if let Token::Command(c) = token {
                command = *c;
                iter.next();
            }
            match command {
                'L' => {
                    let end = read_point(&mut iter, 'L')?;
                    path.line_to(end);
                }
                'C' => {
                    let c1 = read_point(&mut iter, 'C')?;
                    let c2 = read_point(&mut iter, 'C')?;
                    let end = read_point(&mut iter, 'C')?;
                    path.cubic_to(c1, c2, end);
                }
                other => return Err(PathError::UnsupportedCommand(other)),
            }
        }

        Ok(path)
    }

    /// Render as absolute SVG path data
    pub fn to_svg(&self) -> String {
        let mut data = format!("M{:.1},{:.1}", self.start.x, self.start.y);
        for s in &self.segments {
            let _ = write!(
                data,
                " C{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
                s.c1.x, s.c1.y, s.c2.x, s.c2.y, s.end.x, s.end.y
            );
        }
        data
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Command(char),
    Number(String),
}

fn tokenize(data: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut number = String::new();

    let flush = |number: &mut String, tokens: &mut Vec<Token>| {
        if !number.is_empty() {
            tokens.push(Token::Number(std::mem::take(number)));
        }
    };

    for c in data.chars() {
        match c {
            c if c.is_ascii_alphabetic() && c != 'e' && c != 'E' => {
                flush(&mut number, &mut tokens);
                tokens.push(Token::Command(c));
            }
            '-' if !number.is_empty() && !number.ends_with(['e', 'E']) => {
                flush(&mut number, &mut tokens);
                number.push(c);
            }
            c if c == ',' || c.is_whitespace() => flush(&mut number, &mut tokens),
            c => number.push(c),
        }
    }
    flush(&mut number, &mut tokens);
    tokens
}

fn read_number<'a, I>(iter: &mut std::iter::Peekable<I>, command: char) -> Result<f64, PathError>
where
    I: Iterator<Item = &'a Token>,
{
    match iter.next() {
        Some(Token::Number(n)) => n.parse().map_err(|_| PathError::InvalidNumber(n.clone())),
        _ => Err(PathError::UnexpectedEnd(command)),
    }
}

fn read_point<'a, I>(iter: &mut std::iter::Peekable<I>, command: char) -> Result<Point, PathError>
where
    I: Iterator<Item = &'a Token>,
{
    let x = read_number(iter, command)?;
    let y = read_number(iter, command)?;
    Ok(Point::new(x, y))
}

/// Sample `path` at `num_samples + 1` points of equal arc length, sorted by x.
///
/// A path with no drawable extent yields just its start point.
pub fn sample_path(path: &CubicPath, num_samples: usize) -> Vec<Sample> {
    let polyline = path.flatten(FLATTEN_STEPS);
    if polyline.len() < 2 || num_samples == 0 {
        return vec![path.start()];
    }

    let mut cumulative = Vec::with_capacity(polyline.len());
    let mut total = 0.0;
    cumulative.push(0.0);
    for pair in polyline.windows(2) {
        total += pair[0].distance(pair[1]);
        cumulative.push(total);
    }

    let mut samples: Vec<Sample> = (0..=num_samples)
        .map(|i| {
            let target = total * i as f64 / num_samples as f64;
            let idx = cumulative.partition_point(|&len| len < target).clamp(1, polyline.len() - 1);
            let (l0, l1) = (cumulative[idx - 1], cumulative[idx]);
            let t = if l1 > l0 { (target - l0) / (l1 - l0) } else { 0.0 };
            polyline[idx - 1].lerp(polyline[idx], t)
        })
        .collect();

    samples.sort_by(|a, b| a.x.total_cmp(&b.x));
    samples
}

/// Interpolated y at `x`, clamped to the endpoint y outside the sampled range.
///
/// `samples` must be sorted by x.
pub fn y_for_x(samples: &[Sample], x: f64) -> Option<f64> {
    let first = samples.first()?;
    let last = samples.last()?;

    if x <= first.x {
        return Some(first.y);
    }
    if x >= last.x {
        return Some(last.y);
    }

    let idx = samples.partition_point(|s| s.x < x).clamp(1, samples.len() - 1);
    let lower = &samples[idx - 1];
    let upper = &samples[idx];
    if upper.x == lower.x {
        return Some(lower.y);
    }
    let t = (x - lower.x) / (upper.x - lower.x);
    Some(lower.y + t * (upper.y - lower.y))
}

/// Sampled lookup table for one generation of the glucose line
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    samples: Vec<Sample>,
}

impl Curve {
    /// Wrap sorted samples. Fewer than two samples is not a curve.
    pub fn new(samples: Vec<Sample>) -> Option<Self> {
        if samples.len() < 2 {
            return None;
        }
        Some(Self { samples })
    }

    /// Horizontal line at `y` from `from_x` to `to_x`
    pub fn flat(from_x: f64, to_x: f64, y: f64) -> Self {
        Self {
            samples: vec![Point::new(from_x, y), Point::new(to_x, y)],
        }
    }

    pub fn from_path(path: &CubicPath, num_samples: usize) -> Option<Self> {
        Self::new(sample_path(path, num_samples))
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn min_x(&self) -> f64 {
        self.samples[0].x
    }

    pub fn max_x(&self) -> f64 {
        self.samples[self.samples.len() - 1].x
    }

    pub fn y_at(&self, x: f64) -> f64 {
        y_for_x(&self.samples, x).unwrap_or(self.samples[0].y)
    }
}

/// Linear calibration between pixel y and glucose concentration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    anchor_y: f64,
    anchor_glucose: f64,
    /// Glucose units per pixel (negative: higher glucose sits higher up)
    rate: f64,
}

impl Calibration {
    /// Build from two (pixel y, glucose) anchors. Both pairs must differ.
    pub fn from_anchors(a: (f64, f64), b: (f64, f64)) -> Option<Self> {
        let (y1, g1) = a;
        let (y2, g2) = b;
        if y1 == y2 || g1 == g2 || !(y1.is_finite() && y2.is_finite() && g1.is_finite() && g2.is_finite()) {
            return None;
        }
        Some(Self {
            anchor_y: y1,
            anchor_glucose: g1,
            rate: (g2 - g1) / (y2 - y1),
        })
    }

    pub fn y_to_glucose(&self, y: f64) -> f64 {
        self.anchor_glucose + (y - self.anchor_y) * self.rate
    }

    pub fn glucose_to_y(&self, glucose: f64) -> f64 {
        self.anchor_y + (glucose - self.anchor_glucose) / self.rate
    }
}

impl Default for Calibration {
    /// y = 96 is 10.0 mmol/L, y = 156 is 4.0 mmol/L
    fn default() -> Self {
        Self {
            anchor_y: 96.0,
            anchor_glucose: 10.0,
            rate: -0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagonal() -> CubicPath {
        let mut path = CubicPath::new(Point::new(0.0, 0.0));
        path.line_to(Point::new(100.0, 100.0));
        path
    }

    #[test]
    fn test_sample_count_and_order() {
        let path = CubicPath::from_svg("M0,72 C30,70 60,110 100,120 C140,130 170,115 206,118").unwrap();
        let samples = sample_path(&path, 200);
        assert_eq!(samples.len(), 201);
        assert!(samples.windows(2).all(|w| w[0].x <= w[1].x));
        assert_eq!(samples[0], Point::new(0.0, 72.0));
        let last = samples[200];
        assert!((last.x - 206.0).abs() < 1e-9 && (last.y - 118.0).abs() < 1e-9);
    }

    #[test]
    fn test_equal_arc_length_spacing() {
        let samples = sample_path(&diagonal(), 10);
        let step = samples[0].distance(samples[1]);
        for pair in samples.windows(2) {
            assert!((pair[0].distance(pair[1]) - step).abs() < 1e-6);
        }
    }

    #[test]
    fn test_degenerate_path() {
        let path = CubicPath::new(Point::new(5.0, 5.0));
        assert_eq!(sample_path(&path, 100).len(), 1);
        assert!(Curve::from_path(&path, 100).is_none());
    }

    #[test]
    fn test_y_for_x_interpolates() {
        let samples = vec![Point::new(0.0, 10.0), Point::new(10.0, 20.0), Point::new(20.0, 0.0)];
        assert_eq!(y_for_x(&samples, 5.0), Some(15.0));
        assert_eq!(y_for_x(&samples, 15.0), Some(10.0));
        assert_eq!(y_for_x(&samples, 10.0), Some(20.0));
    }

    #[test]
    fn test_y_for_x_clamps() {
        let samples = vec![Point::new(0.0, 10.0), Point::new(10.0, 20.0)];
        assert_eq!(y_for_x(&samples, -50.0), Some(10.0));
        assert_eq!(y_for_x(&samples, 500.0), Some(20.0));
        assert_eq!(y_for_x(&[], 1.0), None);
    }

    #[test]
    fn test_y_for_x_duplicate_x() {
        let samples = vec![Point::new(0.0, 10.0), Point::new(5.0, 12.0), Point::new(5.0, 30.0), Point::new(10.0, 30.0)];
        let y = y_for_x(&samples, 5.0).unwrap();
        assert!(y == 12.0 || y == 30.0);
    }

    #[test]
    fn test_calibration_inverse() {
        let cal = Calibration::default();
        assert!((cal.y_to_glucose(96.0) - 10.0).abs() < 1e-12);
        assert!((cal.y_to_glucose(156.0) - 4.0).abs() < 1e-12);

        let mut y = 0.0;
        while y <= 252.0 {
            assert!((cal.glucose_to_y(cal.y_to_glucose(y)) - y).abs() < 1e-9);
            y += 0.5;
        }
        let mut g = 1.0;
        while g <= 20.0 {
            assert!((cal.y_to_glucose(cal.glucose_to_y(g)) - g).abs() < 1e-9);
            g += 0.1;
        }
    }

    #[test]
    fn test_calibration_from_anchors() {
        let cal = Calibration::from_anchors((96.0, 10.0), (156.0, 4.0)).unwrap();
        assert!((cal.glucose_to_y(4.5) - 151.0).abs() < 1e-9);
        assert!(Calibration::from_anchors((96.0, 10.0), (96.0, 4.0)).is_none());
        assert!(Calibration::from_anchors((96.0, 10.0), (156.0, 10.0)).is_none());
    }

    #[test]
    fn test_svg_round_trip_shape() {
        let path = CubicPath::from_svg("M0 50 L10,50 C20,40 30,40 40,50").unwrap();
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.end(), Point::new(40.0, 50.0));
        assert!(path.to_svg().starts_with("M0.0,50.0 C"));
    }

    #[test]
    fn test_svg_errors() {
        assert_eq!(CubicPath::from_svg(""), Err(PathError::MissingMoveTo));
        assert_eq!(CubicPath::from_svg("Q1,2"), Err(PathError::UnsupportedCommand('Q')));
        assert_eq!(CubicPath::from_svg("M0,0 Q1,2 3,4"), Err(PathError::UnsupportedCommand('Q')));
        assert_eq!(CubicPath::from_svg("M0,0 C1,2 3"), Err(PathError::UnexpectedEnd('C')));
        assert_eq!(
            CubicPath::from_svg("M0,1.2.3"),
            Err(PathError::InvalidNumber("1.2.3".to_string()))
        );
    }

    #[test]
    fn test_svg_negative_numbers() {
        let path = CubicPath::from_svg("M-200,80 C-180.5-70 -10,60 0,72").unwrap();
        assert_eq!(path.start(), Point::new(-200.0, 80.0));
        assert_eq!(path.segments()[0].c1, Point::new(-180.5, -70.0));
    }
}
