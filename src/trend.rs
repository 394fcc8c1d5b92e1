/// Discrete glucose trend shown by the arrow next to the reading.
///
/// Angles rotate an up-pointing arrow clockwise: 0° is straight up (rising
/// fast), 90° is flat, 180° is straight down (falling fast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    RisingFast,
    Rising,
    Stable,
    Falling,
    FallingFast,
}

impl Trend {
    pub const ALL: [Trend; 5] = [
        Trend::RisingFast,
        Trend::Rising,
        Trend::Stable,
        Trend::Falling,
        Trend::FallingFast,
    ];

    /// Classify a pixel slope (dy/dx, y pointing down, so negative is rising)
    pub fn from_slope(slope: f64) -> Self {
        if slope < -0.8 {
            Trend::RisingFast
        } else if slope < -0.2 {
            Trend::Rising
        } else if slope < 0.2 {
            Trend::Stable
        } else if slope < 0.8 {
            Trend::Falling
        } else {
            Trend::FallingFast
        }
    }

    pub fn angle(self) -> u16 {
        match self {
            Trend::RisingFast => 0,
            Trend::Rising => 45,
            Trend::Stable => 90,
            Trend::Falling => 135,
            Trend::FallingFast => 180,
        }
    }

    /// Slope a synthesized curve should approach its end point with
    pub fn target_slope(self) -> f64 {
        match self {
            Trend::RisingFast => -1.2,
            Trend::Rising => -0.5,
            Trend::Stable => 0.0,
            Trend::Falling => 0.5,
            Trend::FallingFast => 1.2,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Trend::RisingFast => "↑",
            Trend::Rising => "↗",
            Trend::Stable => "→",
            Trend::Falling => "↘",
            Trend::FallingFast => "↓",
        }
    }

    /// Next trend in arrow order, wrapping around
    pub fn next(self) -> Self {
        let idx = Trend::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Trend::ALL[(idx + 1) % Trend::ALL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_buckets() {
        assert_eq!(Trend::from_slope(-1.0), Trend::RisingFast);
        assert_eq!(Trend::from_slope(-1.0).angle(), 0);
        assert_eq!(Trend::from_slope(-0.5), Trend::Rising);
        assert_eq!(Trend::from_slope(0.0), Trend::Stable);
        assert_eq!(Trend::from_slope(0.0).angle(), 90);
        assert_eq!(Trend::from_slope(0.5), Trend::Falling);
        assert_eq!(Trend::from_slope(2.0), Trend::FallingFast);
    }

    #[test]
    fn test_bucket_edges() {
        assert_eq!(Trend::from_slope(-0.8), Trend::Rising);
        assert_eq!(Trend::from_slope(-0.2), Trend::Stable);
        assert_eq!(Trend::from_slope(0.2), Trend::Falling);
        assert_eq!(Trend::from_slope(0.8), Trend::FallingFast);
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(Trend::Stable.next(), Trend::Falling);
        assert_eq!(Trend::FallingFast.next(), Trend::RisingFast);
    }

    #[test]
    fn test_target_slope_classifies_back() {
        for trend in Trend::ALL {
            assert_eq!(Trend::from_slope(trend.target_slope()), trend);
        }
    }
}
