//! # Telemetry Source
//!
//! Produces one [`TelemetryRecord`] per poll, either from the tail of the
//! append-only record file or, when that is unavailable, synthesized from
//! plausible ranges so the dashboard stays populated before a link exists.
//!
//! Only a bounded window at the end of the file is read on each poll, so the
//! cost of a poll does not grow as the file does.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::battery::CELL_COUNT;
use super::parser::parse_latest;
use super::record::{FixType, LinkStatus, Provenance, RecordFields, TelemetryRecord};
use crate::config::SimulationConfig;
use crate::error::{GroundStationError, Result};

/// Default number of bytes read from the end of the record file
pub const DEFAULT_TAIL_WINDOW_BYTES: u64 = 4096;

/// Value ranges used when synthesizing a record
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRanges {
    pub signal_strength: RangeInclusive<u8>,
    pub gps_satellites: RangeInclusive<u8>,
    pub fix_code: RangeInclusive<u8>,
    pub longitude: RangeInclusive<f64>,
    pub latitude: RangeInclusive<f64>,
    pub altitude: RangeInclusive<f64>,
    pub roll: RangeInclusive<f64>,
    pub pitch: RangeInclusive<f64>,
    pub yaw: RangeInclusive<f64>,
    pub cell_voltage: RangeInclusive<f64>,
}

impl Default for SimulationRanges {
    fn default() -> Self {
        Self {
            signal_strength: 0..=5,
            gps_satellites: 0..=12,
            fix_code: 0..=2,
            longitude: -180.0..=180.0,
            latitude: -90.0..=90.0,
            altitude: 0.0..=5000.0,
            roll: -180.0..=180.0,
            pitch: -90.0..=90.0,
            yaw: -180.0..=180.0,
            cell_voltage: 3.0..=4.2,
        }
    }
}

impl From<&SimulationConfig> for SimulationRanges {
    fn from(config: &SimulationConfig) -> Self {
        let [rssi_min, rssi_max] = config.signal_strength;
        let [sats_min, sats_max] = config.gps_satellites;
        let [fix_min, fix_max] = config.fix_code;
        let range = |[min, max]: [f64; 2]| min..=max;

        Self {
            signal_strength: rssi_min..=rssi_max,
            gps_satellites: sats_min..=sats_max,
            fix_code: fix_min..=fix_max,
            longitude: range(config.longitude),
            latitude: range(config.latitude),
            altitude: range(config.altitude),
            roll: range(config.roll),
            pitch: range(config.pitch),
            yaw: range(config.yaw),
            cell_voltage: range(config.cell_voltage),
        }
    }
}

/// Reads telemetry snapshots from the record file.
///
/// # Examples
///
/// ```no_run
/// use ground_station::telemetry::source::TelemetrySource;
///
/// let mut source = TelemetrySource::new("output.txt");
/// let record = source.poll();
/// println!("battery {}% ({:?})", record.battery_percentage, record.provenance);
/// ```
#[derive(Debug)]
pub struct TelemetrySource<R = StdRng> {
    path: PathBuf,
    tail_window: u64,
    ranges: SimulationRanges,
    rng: R,
    last_provenance: Option<Provenance>,
}

impl TelemetrySource<StdRng> {
    /// Create a source reading `path`, seeding the fallback generator from entropy.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::with_rng(path, StdRng::from_entropy())
    }
}

impl<R: Rng> TelemetrySource<R> {
    /// Create a source with an explicit random generator for the fallback.
    pub fn with_rng<P: Into<PathBuf>>(path: P, rng: R) -> Self {
        Self {
            path: path.into(),
            tail_window: DEFAULT_TAIL_WINDOW_BYTES,
            ranges: SimulationRanges::default(),
            rng,
            last_provenance: None,
        }
    }

    /// Set how many bytes at the end of the file are searched for the last line.
    #[must_use]
    pub fn tail_window(mut self, bytes: u64) -> Self {
        self.tail_window = bytes.max(1);
        self
    }

    /// Replace the ranges used for synthesized records.
    #[must_use]
    pub fn simulation_ranges(mut self, ranges: SimulationRanges) -> Self {
        self.ranges = ranges;
        self
    }

    /// Path of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Produce the current snapshot.
    ///
    /// Never fails: any problem reading or parsing the record file yields a
    /// synthesized record marked [`Provenance::Simulated`].
    pub fn poll(&mut self) -> TelemetryRecord {
        let record = match self.read_latest() {
            Ok(fields) => TelemetryRecord::new(fields, LinkStatus::default(), Provenance::Live),
            Err(e) => {
                if self.last_provenance != Some(Provenance::Simulated) {
                    warn!("Telemetry unavailable from {}: {}; using simulated values",
                        self.path.display(), e);
                } else {
                    debug!("Telemetry still unavailable: {}", e);
                }
                self.synthesize()
            }
        };

        if record.is_live() && self.last_provenance != Some(Provenance::Live) {
            info!("Receiving live telemetry from {}", self.path.display());
        }
        self.last_provenance = Some(record.provenance);

        record
    }

    /// Read and parse the last non-blank line of the record file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, otherwise whatever
    /// [`parse_latest`] reports for the tail of the file.
    pub fn read_latest(&self) -> Result<RecordFields> {
        let tail = read_tail(&self.path, self.tail_window)?;
        parse_latest(&tail)
    }

    /// Build a record from the configured plausible ranges.
    pub fn synthesize(&mut self) -> TelemetryRecord {
        let ranges = &self.ranges;
        let rng = &mut self.rng;

        let mut cell_voltages = [0.0; CELL_COUNT];
        for cell in cell_voltages.iter_mut() {
            *cell = rng.gen_range(ranges.cell_voltage.clone());
        }

        let fields = RecordFields {
            pitch: rng.gen_range(ranges.pitch.clone()),
            roll: rng.gen_range(ranges.roll.clone()),
            yaw: rng.gen_range(ranges.yaw.clone()),
            cell_voltages,
            total_voltage: cell_voltages.iter().sum(),
            latitude: rng.gen_range(ranges.latitude.clone()),
            longitude: rng.gen_range(ranges.longitude.clone()),
            altitude: rng.gen_range(ranges.altitude.clone()),
        };

        let link = LinkStatus {
            gps_satellites: rng.gen_range(ranges.gps_satellites.clone()),
            gps_fix: FixType::from_code(rng.gen_range(ranges.fix_code.clone())),
            signal_strength: rng.gen_range(ranges.signal_strength.clone()),
        };

        TelemetryRecord::new(fields, link, Provenance::Simulated)
    }
}

/// Read at most `window` bytes from the end of `path`, dropping a leading
/// partial line when the window starts mid-file.
fn read_tail(path: &Path, window: u64) -> Result<String> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Err(GroundStationError::NoRecord(format!("{} is empty", path.display())));
    }

    // Start one byte early so a window that begins exactly on a line
    // boundary can be told apart from one that begins mid-line.
    let start = len.saturating_sub(window);
    let read_from = start.saturating_sub(1);
    file.seek(SeekFrom::Start(read_from))?;

    let mut bytes = Vec::with_capacity((len - read_from) as usize);
    file.take(len - read_from).read_to_end(&mut bytes)?;
    let text = String::from_utf8_lossy(&bytes);

    if start == 0 {
        return Ok(text.into_owned());
    }

    match text.find('\n') {
        Some(index) => Ok(text[index + 1..].to_string()),
        None => Err(GroundStationError::NoRecord(format!(
            "last line of {} exceeds {} bytes",
            path.display(),
            window
        ))),
    }
}
