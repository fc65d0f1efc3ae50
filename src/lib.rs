//! # Ground Station Library
//!
//! Telemetry ingestion and live video overlay for a drone ground-control
//! dashboard.
//!
//! This library reads the vehicle's telemetry record file into typed
//! snapshots, tracks the travelled path, and annotates video frames with the
//! latest orientation and position. When no telemetry link exists yet it
//! produces clearly flagged simulated snapshots so the dashboard stays
//! populated.

pub mod config;
pub mod error;
pub mod map;
pub mod presets;
pub mod readouts;
pub mod station;
pub mod telemetry;
pub mod ticker;
pub mod video;
