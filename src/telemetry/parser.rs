//! # Telemetry Record Parser
//!
//! Parses the `|`-delimited lines written by the onboard telemetry bridge.
//!
//! ## Line Format
//!
//! | Index | Field | Unit |
//! |-------|-------|------|
//! | 0 | Pitch | degrees |
//! | 1 | Roll | degrees |
//! | 2 | Yaw | degrees |
//! | 3-8 | Cell voltages (6) | volts |
//! | 9 | Total voltage | volts |
//! | 10 | Latitude | degrees |
//! | 11 | Longitude | degrees |
//! | 12 | Altitude | meters |
//!
//! The writer terminates each line with a trailing `|`, so anything past the
//! thirteenth field is ignored. Missing, empty or non-numeric fields read as zero.
//!
//! ## Usage
//!
//! ```
//! use ground_station::telemetry::parser::parse_record;
//!
//! let fields = parse_record("1.5|-2|90|4.1|4.1|4.1|4.1|4.1|4.1|24.6|47.39|8.54|420|")?;
//! assert_eq!(fields.yaw, 90.0);
//! assert_eq!(fields.altitude, 420.0);
//! # Ok::<(), ground_station::error::GroundStationError>(())
//! ```

use super::battery::CELL_COUNT;
use super::record::RecordFields;
use crate::error::{GroundStationError, Result};

/// Field separator used by the record file
pub const FIELD_DELIMITER: char = '|';

/// Number of fields in a complete record
pub const RECORD_FIELD_COUNT: usize = 13;

const CELLS_START: usize = 3;
const TOTAL_VOLTAGE_INDEX: usize = CELLS_START + CELL_COUNT;
const LATITUDE_INDEX: usize = TOTAL_VOLTAGE_INDEX + 1;
const LONGITUDE_INDEX: usize = TOTAL_VOLTAGE_INDEX + 2;
const ALTITUDE_INDEX: usize = TOTAL_VOLTAGE_INDEX + 3;

/// Outcome of reading one raw field
#[derive(Debug, Clone, Copy, PartialEq)]
enum RawField {
    /// Absent or blank
    Empty,
    /// Present but not a finite number
    Invalid,
    Number(f64),
}

impl RawField {
    fn parse(raw: Option<&str>) -> Self {
        let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
            return RawField::Empty;
        };

        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => RawField::Number(value),
            _ => RawField::Invalid,
        }
    }

    fn value(self) -> f64 {
        match self {
            RawField::Number(value) => value,
            RawField::Empty | RawField::Invalid => 0.0,
        }
    }
}

/// Return the last line of `text` that contains something other than whitespace.
///
/// The returned line is trimmed.
#[must_use]
pub fn last_non_blank_line(text: &str) -> Option<&str> {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
}

/// Parse the most recent record held in `text`.
///
/// # Errors
///
/// Returns [`GroundStationError::NoRecord`] if `text` has no non-blank line, or
/// [`GroundStationError::MalformedRecord`] if that line holds no numeric field.
pub fn parse_latest(text: &str) -> Result<RecordFields> {
    let line = last_non_blank_line(text)
        .ok_or_else(|| GroundStationError::NoRecord("no non-blank line".to_string()))?;
    parse_record(line)
}

/// Parse a single record line into its thirteen values.
///
/// Each missing, empty or non-numeric field is zero. A line with content but
/// without a single numeric field is rejected rather than read as all zeros.
///
/// # Errors
///
/// Returns [`GroundStationError::NoRecord`] for a blank line and
/// [`GroundStationError::MalformedRecord`] when no field is numeric.
pub fn parse_record(line: &str) -> Result<RecordFields> {
    let line = line.trim();
    if line.is_empty() {
        return Err(GroundStationError::NoRecord("blank line".to_string()));
    }

    let mut raw = [RawField::Empty; RECORD_FIELD_COUNT];
    let mut parts = line.split(FIELD_DELIMITER);
    for slot in raw.iter_mut() {
        *slot = RawField::parse(parts.next());
    }

    let any_number = raw.iter().any(|field| matches!(field, RawField::Number(_)));
    let any_invalid = raw.iter().any(|field| matches!(field, RawField::Invalid));
    if any_invalid && !any_number {
        return Err(GroundStationError::MalformedRecord(format!(
            "no numeric field in line: {}",
            truncate_for_log(line)
        )));
    }

    let mut cell_voltages = [0.0; CELL_COUNT];
    for (cell, field) in cell_voltages.iter_mut().zip(&raw[CELLS_START..TOTAL_VOLTAGE_INDEX]) {
        *cell = field.value();
    }

    Ok(RecordFields {
        pitch: raw[0].value(),
        roll: raw[1].value(),
        yaw: raw[2].value(),
        cell_voltages,
        total_voltage: raw[TOTAL_VOLTAGE_INDEX].value(),
        latitude: raw[LATITUDE_INDEX].value(),
        longitude: raw[LONGITUDE_INDEX].value(),
        altitude: raw[ALTITUDE_INDEX].value(),
    })
}

fn truncate_for_log(line: &str) -> &str {
    const MAX: usize = 64;
    match line.char_indices().nth(MAX) {
        Some((index, _)) => &line[..index],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(fields: &RecordFields) -> [f64; RECORD_FIELD_COUNT] {
        let c = fields.cell_voltages;
        [
            fields.pitch, fields.roll, fields.yaw,
            c[0], c[1], c[2], c[3], c[4], c[5],
            fields.total_voltage, fields.latitude, fields.longitude, fields.altitude,
        ]
    }

    #[test]
    fn test_field_indices() {
        assert_eq!(TOTAL_VOLTAGE_INDEX, 9);
        assert_eq!(LATITUDE_INDEX, 10);
        assert_eq!(LONGITUDE_INDEX, 11);
        assert_eq!(ALTITUDE_INDEX, 12);
        assert_eq!(ALTITUDE_INDEX + 1, RECORD_FIELD_COUNT);
    }

    #[test]
    fn test_well_formed_record_recovers_values() {
        let expected = [
            -3.25, 12.5, 179.99, 4.01, 4.02, 4.03, 4.04, 4.05, 4.06, 24.21, -33.8688, 151.2093, 58.7,
        ];
        let line = expected
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("|");

        let fields = parse_record(&line).unwrap();
        assert_eq!(values(&fields), expected);
    }

    #[test]
    fn test_trailing_delimiter_is_ignored() {
        let line = "1|2|3|4|4|4|4|4|4|24|10|20|30|";
        let fields = parse_record(line).unwrap();
        assert_eq!(fields.altitude, 30.0);
        assert_eq!(fields.longitude, 20.0);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let line = "1|2|3|4|4|4|4|4|4|24|10|20|30|99|100";
        let fields = parse_record(line).unwrap();
        assert_eq!(values(&fields)[12], 30.0);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let fields = parse_record("5|6|7").unwrap();
        assert_eq!(fields.pitch, 5.0);
        assert_eq!(fields.roll, 6.0);
        assert_eq!(fields.yaw, 7.0);
        assert_eq!(fields.cell_voltages, [0.0; CELL_COUNT]);
        assert_eq!(fields.total_voltage, 0.0);
        assert_eq!(fields.latitude, 0.0);
        assert_eq!(fields.longitude, 0.0);
        assert_eq!(fields.altitude, 0.0);
    }

    #[test]
    fn test_every_subset_of_empty_fields() {
        let base: Vec<f64> = (1..=RECORD_FIELD_COUNT).map(|i| i as f64 * 1.5).collect();

        // Exhaustive over all 2^13 masks of blanked fields
        for mask in 0u32..(1 << RECORD_FIELD_COUNT) {
            let line = base
                .iter()
                .enumerate()
                .map(|(i, v)| if mask & (1 << i) != 0 { String::new() } else { v.to_string() })
                .collect::<Vec<_>>()
                .join("|");

            let fields = parse_record(&line)
                .unwrap_or_else(|e| panic!("mask {:#x} failed: {}", mask, e));
            for (i, value) in values(&fields).iter().enumerate() {
                let expected = if mask & (1 << i) != 0 { 0.0 } else { base[i] };
                assert_eq!(*value, expected, "mask {:#x}, field {}", mask, i);
            }
        }
    }

    #[test]
    fn test_whitespace_around_fields() {
        let fields = parse_record(" 1.0 | 2.0 |3.0|  |4|4|4|4|4|24|1|2|3").unwrap();
        assert_eq!(fields.pitch, 1.0);
        assert_eq!(fields.roll, 2.0);
        assert_eq!(fields.cell_voltages[0], 0.0);
        assert_eq!(fields.cell_voltages[1], 4.0);
    }

    #[test]
    fn test_non_numeric_field_reads_as_zero() {
        let fields = parse_record("1|oops|3|4|4|4|4|4|4|24|1|2|3").unwrap();
        assert_eq!(fields.pitch, 1.0);
        assert_eq!(fields.roll, 0.0);
        assert_eq!(fields.yaw, 3.0);
    }

    #[test]
    fn test_non_finite_field_reads_as_zero() {
        let fields = parse_record("nan|inf|-inf|4|4|4|4|4|4|24|1|2|3").unwrap();
        assert_eq!(fields.pitch, 0.0);
        assert_eq!(fields.roll, 0.0);
        assert_eq!(fields.yaw, 0.0);
        assert_eq!(fields.total_voltage, 24.0);
    }

    #[test]
    fn test_all_delimiters_is_all_zero() {
        let fields = parse_record("||||||||||||").unwrap();
        assert_eq!(fields, RecordFields::default());
    }

    #[test]
    fn test_line_without_numbers_is_malformed() {
        let result = parse_record("Pitch: unavailable");
        assert!(matches!(result, Err(GroundStationError::MalformedRecord(_))));

        let result = parse_record("a|b|c");
        assert!(matches!(result, Err(GroundStationError::MalformedRecord(_))));
    }

    #[test]
    fn test_blank_line_is_no_record() {
        assert!(matches!(parse_record("   "), Err(GroundStationError::NoRecord(_))));
    }

    #[test]
    fn test_last_non_blank_line() {
        let text = "1|2|3\n4|5|6\n\n   \n";
        assert_eq!(last_non_blank_line(text), Some("4|5|6"));
        assert_eq!(last_non_blank_line("\n \n\t\n"), None);
        assert_eq!(last_non_blank_line(""), None);
    }

    #[test]
    fn test_last_non_blank_line_handles_crlf() {
        assert_eq!(last_non_blank_line("1|2\r\n3|4\r\n"), Some("3|4"));
    }

    #[test]
    fn test_parse_latest_uses_last_line() {
        let text = "1|1|1|4|4|4|4|4|4|24|1|1|1|\n2|2|2|4|4|4|4|4|4|24|2|2|2|\n";
        let fields = parse_latest(text).unwrap();
        assert_eq!(fields.pitch, 2.0);
    }

    #[test]
    fn test_parse_latest_empty_text() {
        assert!(matches!(parse_latest("\n\n"), Err(GroundStationError::NoRecord(_))));
    }

    #[test]
    fn test_truncate_for_log() {
        let long = "x".repeat(200);
        assert_eq!(truncate_for_log(&long).len(), 64);
        assert_eq!(truncate_for_log("short"), "short");
    }
}
