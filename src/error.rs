//! # Error Types
//!
//! Custom error types for the ground station using `thiserror`.

use thiserror::Error;

/// Main error type for the ground station
#[derive(Debug, Error)]
pub enum GroundStationError {
    /// The record file exists but holds nothing usable
    #[error("No telemetry record available: {0}")]
    NoRecord(String),

    /// A telemetry line with content but no numeric field
    #[error("Malformed telemetry record: {0}")]
    MalformedRecord(String),

    /// Video stream could not be opened
    #[error("Failed to open video stream: {0}")]
    VideoOpen(String),

    /// Video stream failed while reading a frame
    #[error("Video frame read failed: {0}")]
    VideoRead(String),

    /// Connection preset errors
    #[error("Connection preset error: {0}")]
    Preset(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Snapshot serialization errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the ground station
pub type Result<T> = std::result::Result<T, GroundStationError>;
