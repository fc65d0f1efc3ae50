//! # Map Module
//!
//! Position fixes and the trail of where the vehicle has been.
//!
//! The map widget itself lives in the presentation layer; it reads the
//! [`trail::TrailTracker`] to draw the marker and path and may ask for a clear.

pub mod trail;

pub use trail::{TrailTracker, DEFAULT_MAX_TRAIL_POINTS};

use serde::Serialize;

/// A single (latitude, longitude) observation in degrees.
///
/// `(0.0, 0.0)` is an ordinary fix; whether any fix exists is tracked
/// separately by the trail tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
}

impl PositionFix {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}
