//! # Position Trail Tracker
//!
//! Maintains the current fix and a bounded, de-duplicated history of fixes.
//!
//! ## Policy
//!
//! - A fix equal to the most recent trail entry is not appended, so a
//!   stationary vehicle does not grow the trail.
//! - Once the trail exceeds its cap, the single oldest entry is evicted.
//! - Clearing drops the history only; the current fix is kept.
//!
//! ## Usage
//!
//! ```
//! use ground_station::map::TrailTracker;
//!
//! let mut tracker = TrailTracker::new();
//! tracker.update(1.0, 2.0);
//! tracker.update(1.0, 2.0);
//! assert_eq!(tracker.len(), 1);
//!
//! tracker.clear();
//! assert!(tracker.is_empty());
//! assert!(tracker.current_fix().is_some());
//! ```

use std::collections::VecDeque;
use tracing::debug;

use super::PositionFix;

/// Default maximum number of retained trail points
pub const DEFAULT_MAX_TRAIL_POINTS: usize = 1000;

/// Owns the vehicle's position history
#[derive(Debug, Clone)]
pub struct TrailTracker {
    current_fix: Option<PositionFix>,
    trail: VecDeque<PositionFix>,
    max_points: usize,
    generation: u64,
}

impl Default for TrailTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TrailTracker {
    /// Create a tracker holding up to [`DEFAULT_MAX_TRAIL_POINTS`] points.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_TRAIL_POINTS)
    }

    /// Create a tracker holding up to `max_points` points (at least 1).
    #[must_use]
    pub fn with_capacity(max_points: usize) -> Self {
        let max_points = max_points.max(1);
        Self {
            current_fix: None,
            trail: VecDeque::with_capacity(max_points + 1),
            max_points,
            generation: 0,
        }
    }

    /// Record a new fix.
    ///
    /// Always updates the current fix. Appends to the trail unless the fix
    /// equals the most recent trail entry, then evicts the oldest entry if
    /// the cap is exceeded.
    pub fn update(&mut self, latitude: f64, longitude: f64) {
        let fix = PositionFix::new(latitude, longitude);
        self.current_fix = Some(fix);

        if self.trail.back() == Some(&fix) {
            return;
        }

        self.trail.push_back(fix);
        if self.trail.len() > self.max_points {
            self.trail.pop_front();
        }
    }

    /// Forget the trail history.
    ///
    /// Bumps [`generation`](Self::generation) so a renderer holding a drawn
    /// path knows to drop it. The current fix is left as is.
    pub fn clear(&mut self) {
        debug!("Clearing position trail ({} points)", self.trail.len());
        self.trail.clear();
        self.generation += 1;
    }

    /// Most recent fix, or `None` before the first update.
    #[must_use]
    pub fn current_fix(&self) -> Option<PositionFix> {
        self.current_fix
    }

    /// Whether any fix has been received yet.
    #[must_use]
    pub fn has_fix(&self) -> bool {
        self.current_fix.is_some()
    }

    /// Trail points, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &PositionFix> + '_ {
        self.trail.iter()
    }

    /// Number of retained trail points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trail.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    /// Maximum number of retained trail points.
    #[must_use]
    pub fn max_points(&self) -> usize {
        self.max_points
    }

    /// Number of times the trail has been cleared.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Points to draw as a path, or `None` while fewer than two are known.
    #[must_use]
    pub fn polyline(&self) -> Option<Vec<PositionFix>> {
        (self.trail.len() > 1).then(|| self.trail.iter().copied().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_without_fix() {
        let tracker = TrailTracker::new();
        assert!(tracker.current_fix().is_none());
        assert!(!tracker.has_fix());
        assert!(tracker.is_empty());
        assert_eq!(tracker.max_points(), DEFAULT_MAX_TRAIL_POINTS);
    }

    #[test]
    fn test_duplicate_fix_not_appended() {
        let mut tracker = TrailTracker::new();
        tracker.update(1.0, 2.0);
        tracker.update(1.0, 2.0);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_small_change_is_appended() {
        let mut tracker = TrailTracker::new();
        tracker.update(1.0, 2.0);
        tracker.update(1.0, 2.0001);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_only_consecutive_duplicates_are_dropped() {
        let mut tracker = TrailTracker::new();
        tracker.update(1.0, 1.0);
        tracker.update(2.0, 2.0);
        tracker.update(1.0, 1.0);
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn test_repeated_update_is_idempotent() {
        let mut tracker = TrailTracker::new();
        tracker.update(47.0, 8.0);
        for _ in 0..100 {
            tracker.update(47.0, 8.0);
        }
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.current_fix(), Some(PositionFix::new(47.0, 8.0)));
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut tracker = TrailTracker::new();
        for i in 1..=1001 {
            tracker.update(i as f64, 0.0);
        }

        assert_eq!(tracker.len(), 1000);
        let points: Vec<_> = tracker.trail().copied().collect();
        assert_eq!(points.first(), Some(&PositionFix::new(2.0, 0.0)));
        assert_eq!(points.last(), Some(&PositionFix::new(1001.0, 0.0)));
        for (offset, point) in points.iter().enumerate() {
            assert_eq!(point.latitude, (offset + 2) as f64);
        }
    }

    #[test]
    fn test_custom_capacity() {
        let mut tracker = TrailTracker::with_capacity(3);
        for i in 0..10 {
            tracker.update(0.0, i as f64);
        }
        let longitudes: Vec<f64> = tracker.trail().map(|p| p.longitude).collect();
        assert_eq!(longitudes, vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_clear_keeps_current_fix() {
        let mut tracker = TrailTracker::new();
        tracker.update(1.0, 2.0);
        tracker.update(3.0, 4.0);
        tracker.clear();

        assert!(tracker.is_empty());
        assert_eq!(tracker.current_fix(), Some(PositionFix::new(3.0, 4.0)));
        assert_eq!(tracker.generation(), 1);
    }

    #[test]
    fn test_update_after_clear_restarts_trail() {
        let mut tracker = TrailTracker::new();
        tracker.update(3.0, 4.0);
        tracker.clear();
        tracker.update(3.0, 4.0);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_zero_zero_is_a_real_fix() {
        let mut tracker = TrailTracker::new();
        tracker.update(0.0, 0.0);
        assert!(tracker.has_fix());
        assert_eq!(tracker.current_fix(), Some(PositionFix::new(0.0, 0.0)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_polyline_needs_two_points() {
        let mut tracker = TrailTracker::new();
        assert!(tracker.polyline().is_none());

        tracker.update(1.0, 1.0);
        assert!(tracker.polyline().is_none());

        tracker.update(1.5, 1.0);
        let path = tracker.polyline().unwrap();
        assert_eq!(path, vec![PositionFix::new(1.0, 1.0), PositionFix::new(1.5, 1.0)]);
    }
}
