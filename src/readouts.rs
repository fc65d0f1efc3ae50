//! # Dashboard Readouts
//!
//! Display strings and gauge values derived from a telemetry snapshot.

use crate::map::PositionFix;
use crate::telemetry::TelemetryRecord;

/// Width in pixels of the battery icon's fill area
pub const BATTERY_ICON_WIDTH: u32 = 56;

/// Number of bars on the signal strength gauge
pub const RSSI_BAR_COUNT: u8 = 5;

/// Readouts for one refresh of the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardReadouts {
    /// e.g. `85.71% | 21.60V`
    pub battery_label: String,
    /// Filled width of the battery icon in pixels
    pub battery_fill_width: u32,
    /// Lit bars out of [`RSSI_BAR_COUNT`]
    pub rssi_bars: u8,
    pub gps_sats_label: String,
    pub gps_fix_label: String,
    /// Present once the trail has a fix
    pub position_label: Option<String>,
}

impl DashboardReadouts {
    /// Build readouts from a snapshot and the trail's current fix.
    ///
    /// # Examples
    ///
    /// ```
    /// use ground_station::readouts::DashboardReadouts;
    /// use ground_station::telemetry::{LinkStatus, Provenance, RecordFields, TelemetryRecord};
    ///
    /// let fields = RecordFields { total_voltage: 25.2, ..Default::default() };
    /// let record = TelemetryRecord::new(fields, LinkStatus::default(), Provenance::Live);
    /// let readouts = DashboardReadouts::new(&record, None);
    /// assert_eq!(readouts.battery_label, "100.00% | 25.20V");
    /// assert_eq!(readouts.battery_fill_width, 56);
    /// ```
    #[must_use]
    pub fn new(record: &TelemetryRecord, current_fix: Option<PositionFix>) -> Self {
        let pct = record.battery_percentage;
        Self {
            battery_label: format!("{:.2}% | {:.2}V", pct, record.fields.total_voltage),
            battery_fill_width: battery_fill_width(pct),
            rssi_bars: record.link.signal_strength.min(RSSI_BAR_COUNT),
            gps_sats_label: format!("GPS SATS: {}", record.link.gps_satellites),
            gps_fix_label: format!("GPS Fix Type: {}", record.link.gps_fix.code()),
            position_label: current_fix.map(|fix| {
                format!("Current Position: {:.6}°, {:.6}°", fix.latitude, fix.longitude)
            }),
        }
    }
}

/// Filled width of the battery icon for a charge percentage.
#[must_use]
pub fn battery_fill_width(percentage: f64) -> u32 {
    let pct = percentage.clamp(0.0, 100.0);
    (f64::from(BATTERY_ICON_WIDTH) * pct / 100.0).floor() as u32
}
