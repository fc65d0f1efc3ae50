//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GroundStationError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub trail: TrailConfig,
    #[serde(default)]
    pub presets: PresetsConfig,
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telemetry record file configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_record_path")]
    pub record_path: PathBuf,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_tail_window_bytes")]
    pub tail_window_bytes: u64,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Inclusive `[min, max]` ranges for synthesized telemetry
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SimulationConfig {
    #[serde(default = "default_signal_strength_range")]
    pub signal_strength: [u8; 2],

    #[serde(default = "default_gps_satellites_range")]
    pub gps_satellites: [u8; 2],

    #[serde(default = "default_fix_code_range")]
    pub fix_code: [u8; 2],

    #[serde(default = "default_longitude_range")]
    pub longitude: [f64; 2],

    #[serde(default = "default_latitude_range")]
    pub latitude: [f64; 2],

    #[serde(default = "default_altitude_range")]
    pub altitude: [f64; 2],

    #[serde(default = "default_roll_range")]
    pub roll: [f64; 2],

    #[serde(default = "default_pitch_range")]
    pub pitch: [f64; 2],

    #[serde(default = "default_yaw_range")]
    pub yaw: [f64; 2],

    #[serde(default = "default_cell_voltage_range")]
    pub cell_voltage: [f64; 2],
}

/// Video stream configuration
#[derive(Debug, Deserialize, Clone)]
pub struct VideoConfig {
    #[serde(default = "default_video_url")]
    pub url: String,

    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    #[serde(default = "default_drain_frames")]
    pub drain_frames: usize,

    #[serde(default)]
    pub autoplay: bool,
}

/// Position trail configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TrailConfig {
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

/// Connection preset store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PresetsConfig {
    #[serde(default = "default_presets_path")]
    pub path: PathBuf,
}

/// Snapshot recorder configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RecorderConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

/// Application log configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for daily-rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,
}

// Default value functions
fn default_record_path() -> PathBuf { PathBuf::from("output.txt") }
fn default_poll_interval_ms() -> u64 { 100 }
fn default_tail_window_bytes() -> u64 { 4096 }

fn default_signal_strength_range() -> [u8; 2] { [0, 5] }
fn default_gps_satellites_range() -> [u8; 2] { [0, 12] }
fn default_fix_code_range() -> [u8; 2] { [0, 2] }
fn default_longitude_range() -> [f64; 2] { [-180.0, 180.0] }
fn default_latitude_range() -> [f64; 2] { [-90.0, 90.0] }
fn default_altitude_range() -> [f64; 2] { [0.0, 5000.0] }
fn default_roll_range() -> [f64; 2] { [-180.0, 180.0] }
fn default_pitch_range() -> [f64; 2] { [-90.0, 90.0] }
fn default_yaw_range() -> [f64; 2] { [-180.0, 180.0] }
fn default_cell_voltage_range() -> [f64; 2] { [3.0, 4.2] }

fn default_video_url() -> String { "rtsp://192.168.144.25:8554/main.264".to_string() }
fn default_frame_interval_ms() -> u64 { 10 }
fn default_drain_frames() -> usize { 5 }

fn default_max_points() -> usize { 1000 }

fn default_presets_path() -> PathBuf { PathBuf::from("connection_presets.txt") }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            record_path: default_record_path(),
            poll_interval_ms: default_poll_interval_ms(),
            tail_window_bytes: default_tail_window_bytes(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            signal_strength: default_signal_strength_range(),
            gps_satellites: default_gps_satellites_range(),
            fix_code: default_fix_code_range(),
            longitude: default_longitude_range(),
            latitude: default_latitude_range(),
            altitude: default_altitude_range(),
            roll: default_roll_range(),
            pitch: default_pitch_range(),
            yaw: default_yaw_range(),
            cell_voltage: default_cell_voltage_range(),
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            url: default_video_url(),
            frame_interval_ms: default_frame_interval_ms(),
            drain_frames: default_drain_frames(),
            autoplay: false,
        }
    }
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self { max_points: default_max_points() }
    }
}

impl Default for PresetsConfig {
    fn default() -> Self {
        Self { path: default_presets_path() }
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

fn invalid(msg: impl std::fmt::Display) -> GroundStationError {
    GroundStationError::Config(toml::de::Error::custom(msg))
}

impl SimulationConfig {
    /// Check that every range is ordered and finite
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("signal_strength", self.signal_strength),
            ("gps_satellites", self.gps_satellites),
            ("fix_code", self.fix_code),
        ];
        for (name, [min, max]) in counts {
            if min > max {
                return Err(invalid(format!("simulation {} range must be [min, max]", name)));
            }
        }

        if self.signal_strength[1] > 5 {
            return Err(invalid("simulation signal_strength cannot exceed 5 bars"));
        }

        if self.fix_code[1] > 2 {
            return Err(invalid("simulation fix_code must be between 0 and 2"));
        }

        let values = [
            ("longitude", self.longitude),
            ("latitude", self.latitude),
            ("altitude", self.altitude),
            ("roll", self.roll),
            ("pitch", self.pitch),
            ("yaw", self.yaw),
            ("cell_voltage", self.cell_voltage),
        ];
        for (name, [min, max]) in values {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(invalid(format!("simulation {} range must be finite [min, max]", name)));
            }
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ground_station::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.telemetry.record_path.as_os_str().is_empty() {
            return Err(invalid("telemetry record_path cannot be empty"));
        }

        if self.telemetry.poll_interval_ms == 0 || self.telemetry.poll_interval_ms > 60000 {
            return Err(invalid("poll_interval_ms must be between 1 and 60000"));
        }

        // A single record line is well under 256 bytes
        if self.telemetry.tail_window_bytes < 256 || self.telemetry.tail_window_bytes > 1 << 20 {
            return Err(invalid("tail_window_bytes must be between 256 and 1048576"));
        }

        self.telemetry.simulation.validate()?;

        if !self.video.url.contains("://") {
            return Err(invalid("video url must be of the form scheme://host:port/path"));
        }

        if self.video.frame_interval_ms == 0 || self.video.frame_interval_ms > 1000 {
            return Err(invalid("frame_interval_ms must be between 1 and 1000"));
        }

        if self.video.drain_frames > 30 {
            return Err(invalid("drain_frames must be between 0 and 30"));
        }

        if self.trail.max_points < 2 {
            return Err(invalid("trail max_points must be at least 2"));
        }

        if self.presets.path.as_os_str().is_empty() {
            return Err(invalid("presets path cannot be empty"));
        }

        if self.recorder.enabled && self.recorder.log_dir.is_empty() {
            return Err(invalid("recorder log_dir cannot be empty when enabled"));
        }

        if self.recorder.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.recorder.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if matches!(&self.logging.log_dir, Some(dir) if dir.is_empty()) {
            return Err(invalid("logging log_dir cannot be empty when set"));
        }

        Ok(())
    }
}
