//! Coarse "how long ago" labels for the scrub position.
//!
//! The full graph domain (history start to now) stands for 12 hours.

use serde::{Deserialize, Serialize};

/// Real time covered by the whole graph domain
pub const GRAPH_SPAN_MINUTES: f64 = 720.0;

/// Display language, persisted in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hr,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Hr,
            Language::Hr => Language::En,
        }
    }
}

/// Label text, split over two lines when long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyTime {
    pub line1: String,
    pub line2: String,
}

impl FuzzyTime {
    fn one_line(text: impl Into<String>) -> Self {
        Self { line1: text.into(), line2: String::new() }
    }

    fn two_lines(first: &str, second: &str) -> Self {
        Self { line1: first.to_string(), line2: second.to_string() }
    }

    pub fn is_two_line(&self) -> bool {
        !self.line2.is_empty()
    }

    /// Background badge `(width, height, offset above baseline)` fitted to the text
    pub fn badge_size(&self) -> (f64, f64, f64) {
        if self.is_two_line() {
            (36.0, 24.0, 8.0)
        } else if self.line1 == "now" || self.line1 == "sada" {
            (26.0, 14.0, 10.0)
        } else if self.line1 == "just now" || self.line1 == "upravo" {
            (40.0, 14.0, 10.0)
        } else {
            (52.0, 14.0, 10.0)
        }
    }
}

/// Minutes before now for a graph-space distance, given the domain width
pub fn minutes_ago(distance_from_now: f64, domain_width: f64) -> f64 {
    if domain_width <= 0.0 {
        return 0.0;
    }
    distance_from_now.max(0.0) / domain_width * GRAPH_SPAN_MINUTES
}

pub fn fuzzy_time(minutes_ago: f64, language: Language) -> FuzzyTime {
    if minutes_ago < 1.0 {
        return match language {
            Language::En => FuzzyTime::one_line("now"),
            Language::Hr => FuzzyTime::one_line("sada"),
        };
    }
    if minutes_ago < 5.0 {
        return match language {
            Language::En => FuzzyTime::one_line("just now"),
            Language::Hr => FuzzyTime::one_line("upravo"),
        };
    }
    if minutes_ago < 30.0 {
        return match language {
            Language::En => FuzzyTime::two_lines("few min", "ago"),
            Language::Hr => FuzzyTime::two_lines("par min", "prije"),
        };
    }
    if minutes_ago < 60.0 {
        return match language {
            Language::En => FuzzyTime::one_line("30 min ago"),
            Language::Hr => FuzzyTime::one_line("prije 30 min"),
        };
    }

    let hours = ((minutes_ago / 60.0).floor() as u32).min(12);
    match language {
        Language::En => FuzzyTime::one_line(format!("{} h ago", hours)),
        Language::Hr => FuzzyTime::one_line(format!("prije {} h", hours)),
    }
}
