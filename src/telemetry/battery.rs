//! # Derived Battery Metrics
//!
//! Battery percentage from total pack voltage for a 6S LiPo pack.
//!
//! The formula used is: `percent = total_voltage / (cells * 4.2 V) * 100`,
//! rounded to two decimals and clamped to 0-100%.
//!
//! ## Usage
//!
//! ```
//! use ground_station::telemetry::battery::battery_percentage;
//!
//! assert_eq!(battery_percentage(25.2), 100.0);
//! assert_eq!(battery_percentage(12.6), 50.0);
//! assert_eq!(battery_percentage(-3.0), 0.0);
//! ```

/// Number of cells in the pack
pub const CELL_COUNT: usize = 6;

/// Fully charged LiPo cell voltage
pub const MAX_CELL_VOLTAGE: f64 = 4.2;

/// Convert a total pack voltage into a charge percentage.
///
/// Monotonically non-decreasing in `total_voltage`. Non-finite input maps to 0.
#[must_use]
pub fn battery_percentage(total_voltage: f64) -> f64 {
    if !total_voltage.is_finite() {
        return 0.0;
    }

    let percent = total_voltage / (CELL_COUNT as f64 * MAX_CELL_VOLTAGE) * 100.0;
    let rounded = (percent * 100.0).round() / 100.0;
    rounded.clamp(0.0, 100.0)
}
