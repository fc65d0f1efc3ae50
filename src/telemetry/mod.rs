//! # Telemetry Module
//!
//! Turns the onboard bridge's record file into typed snapshots.
//!
//! This module handles:
//! - Reading the last non-blank line of the append-only record file
//! - Parsing the 13 `|`-delimited fields, tolerating missing values
//! - Deriving battery percentage from pack voltage
//! - Synthesizing plausible values when no record is available
//! - Recording snapshots to rotating JSONL files

pub mod battery;
pub mod parser;
pub mod record;
pub mod recorder;
pub mod source;

pub use record::{FixType, LinkStatus, Provenance, RecordFields, TelemetryRecord};
pub use source::TelemetrySource;
