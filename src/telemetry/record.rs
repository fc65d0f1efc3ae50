//! # Telemetry Record Types
//!
//! The typed snapshot produced on every telemetry tick.

use serde::Serialize;

use super::battery::{battery_percentage, CELL_COUNT};
use crate::map::PositionFix;

/// GPS fix type as reported by the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FixType {
    /// No position fix
    #[default]
    None,
    /// Two-dimensional fix
    #[serde(rename = "2d")]
    Fix2D,
    /// Three-dimensional fix
    #[serde(rename = "3d")]
    Fix3D,
}

impl FixType {
    /// Map the dashboard's numeric fix code (0, 1, 2) to a fix type.
    ///
    /// Codes above 2 saturate to [`FixType::Fix3D`].
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => FixType::None,
            1 => FixType::Fix2D,
            _ => FixType::Fix3D,
        }
    }

    /// Numeric code shown on the dashboard.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            FixType::None => 0,
            FixType::Fix2D => 1,
            FixType::Fix3D => 2,
        }
    }
}

/// Where a snapshot's values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Parsed from the telemetry record file
    Live,
    /// Synthesized because no usable record was available
    Simulated,
}

/// The thirteen values carried by one line of the record file, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RecordFields {
    /// Pitch in degrees
    pub pitch: f64,
    /// Roll in degrees
    pub roll: f64,
    /// Yaw in degrees
    pub yaw: f64,
    /// Per-cell voltages in volts
    pub cell_voltages: [f64; CELL_COUNT],
    /// Total pack voltage in volts
    pub total_voltage: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Altitude in meters
    pub altitude: f64,
}

/// Link and GPS status values that the record file does not carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LinkStatus {
    /// Number of GPS satellites in view
    pub gps_satellites: u8,
    /// GPS fix type
    pub gps_fix: FixType,
    /// Signal strength bars (0-5)
    pub signal_strength: u8,
}

/// One point-in-time set of vehicle measurements.
///
/// `battery_percentage` is always derived from `total_voltage`; construct
/// records through [`TelemetryRecord::new`] so the two never disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    #[serde(flatten)]
    pub fields: RecordFields,
    #[serde(flatten)]
    pub link: LinkStatus,
    /// Battery charge (0-100%), derived from the pack voltage
    pub battery_percentage: f64,
    pub provenance: Provenance,
}

impl TelemetryRecord {
    /// Build a snapshot, deriving the battery percentage from the pack voltage.
    ///
    /// # Examples
    ///
    /// ```
    /// use ground_station::telemetry::record::{LinkStatus, Provenance, RecordFields, TelemetryRecord};
    ///
    /// let fields = RecordFields { total_voltage: 25.2, ..Default::default() };
    /// let record = TelemetryRecord::new(fields, LinkStatus::default(), Provenance::Live);
    /// assert_eq!(record.battery_percentage, 100.0);
    /// ```
    #[must_use]
    pub fn new(fields: RecordFields, link: LinkStatus, provenance: Provenance) -> Self {
        Self {
            fields,
            link,
            battery_percentage: battery_percentage(fields.total_voltage),
            provenance,
        }
    }

    /// Current position of the vehicle.
    #[must_use]
    pub fn position(&self) -> PositionFix {
        PositionFix::new(self.fields.latitude, self.fields.longitude)
    }

    /// Whether this snapshot came from the record file.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.provenance == Provenance::Live
    }

    /// Whether this snapshot was synthesized.
    #[must_use]
    pub fn is_simulated(&self) -> bool {
        self.provenance == Provenance::Simulated
    }
}
