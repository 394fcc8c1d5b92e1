//! # UI Module
//!
//! Styling for the controls around the watch face. The face itself is drawn
//! by `charts::GlucoseChart`.
//!
//! ## Organization
//! - `styles`: Button styles for the demo controls

pub mod styles;
