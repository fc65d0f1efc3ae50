//! # Connection Presets
//!
//! Named video connection settings, persisted one per line as `name|ip|port`.
//!
//! Loading skips lines that do not have exactly three fields, so a damaged
//! line never hides the rest of the file. Saving then loading yields the same
//! mapping.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{GroundStationError, Result};

const FIELD_DELIMITER: char = '|';

/// Stream path used when the preset only names a port
pub const DEFAULT_STREAM_PATH: &str = "main.264";

/// One saved connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionPreset {
    pub ip: String,
    /// RTSP port, or a complete stream URL
    pub port: String,
}

impl ConnectionPreset {
    pub fn new<I: Into<String>, P: Into<String>>(ip: I, port: P) -> Self {
        Self { ip: ip.into(), port: port.into() }
    }

    /// URL of the video stream for this preset.
    ///
    /// A port field that already holds a full URL is used as is.
    ///
    /// # Examples
    ///
    /// ```
    /// use ground_station::presets::ConnectionPreset;
    ///
    /// let preset = ConnectionPreset::new("192.168.144.25", "8554");
    /// assert_eq!(preset.stream_url(), "rtsp://192.168.144.25:8554/main.264");
    ///
    /// let custom = ConnectionPreset::new("10.0.0.2", "rtsp://10.0.0.2:554/live");
    /// assert_eq!(custom.stream_url(), "rtsp://10.0.0.2:554/live");
    /// ```
    #[must_use]
    pub fn stream_url(&self) -> String {
        if self.port.contains("://") {
            self.port.clone()
        } else {
            format!("rtsp://{}:{}/{}", self.ip, self.port, DEFAULT_STREAM_PATH)
        }
    }
}

/// File-backed mapping of preset name to connection
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
    presets: BTreeMap<String, ConnectionPreset>,
}

impl PresetStore {
    /// An empty store that will save to `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into(), presets: BTreeMap::new() }
    }

    /// Load presets from `path`. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be read.
    pub fn load<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let mut store = Self::new(path);
        let contents = match fs::read_to_string(&store.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No preset file at {}", store.path.display());
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };

        for (number, line) in contents.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
            match fields.as_slice() {
                [name, ip, port] => {
                    store.presets.insert(name.to_string(), ConnectionPreset::new(*ip, *port));
                }
                _ => warn!("Skipping malformed preset on line {} of {}", number + 1, store.path.display()),
            }
        }

        info!("Loaded {} connection presets from {}", store.presets.len(), store.path.display());
        Ok(store)
    }

    /// Write all presets to the store's file, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        let mut contents = String::new();
        for (name, preset) in &self.presets {
            contents.push_str(&format!("{}|{}|{}\n", name, preset.ip, preset.port));
        }
        fs::write(&self.path, contents)?;
        debug!("Saved {} connection presets to {}", self.presets.len(), self.path.display());
        Ok(())
    }

    /// Add a new preset.
    ///
    /// # Errors
    ///
    /// Returns [`GroundStationError::Preset`] if a field is empty, contains
    /// `|` or a line break, or if the name is already taken.
    pub fn insert(&mut self, name: &str, preset: ConnectionPreset) -> Result<()> {
        if self.presets.contains_key(name) {
            return Err(GroundStationError::Preset(format!("a preset named '{}' already exists", name)));
        }
        self.upsert(name, preset)
    }

    /// Add a preset or replace the one with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`GroundStationError::Preset`] if a field is empty or contains
    /// `|` or a line break.
    pub fn upsert(&mut self, name: &str, preset: ConnectionPreset) -> Result<()> {
        for (label, value) in [("name", name), ("ip", &preset.ip), ("port", &preset.port)] {
            validate_field(label, value)?;
        }
        self.presets.insert(name.to_string(), preset);
        Ok(())
    }

    /// Remove a preset, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<ConnectionPreset> {
        self.presets.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ConnectionPreset> {
        self.presets.get(name)
    }

    /// Presets ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConnectionPreset)> + '_ {
        self.presets.iter().map(|(name, preset)| (name.as_str(), preset))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn validate_field(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GroundStationError::Preset(format!("{} is required", label)));
    }
    if value.contains(FIELD_DELIMITER) || value.contains('\n') || value.contains('\r') {
        return Err(GroundStationError::Preset(format!(
            "{} cannot contain '|' or line breaks",
            label
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PresetStore {
        PresetStore::new(dir.path().join("connection_presets.txt"))
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = PresetStore::load(dir.path().join("absent.txt")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert("field", ConnectionPreset::new("192.168.144.25", "8554")).unwrap();
        store.insert("bench", ConnectionPreset::new("10.0.0.2", "rtsp://10.0.0.2:554/live")).unwrap();
        store.save().unwrap();

        let loaded = PresetStore::load(store.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        let original: Vec<_> = store.iter().collect();
        let reloaded: Vec<_> = loaded.iter().collect();
        assert_eq!(original, reloaded);
    }

    #[test]
    fn test_update_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert("field", ConnectionPreset::new("192.168.144.25", "8554")).unwrap();
        store.save().unwrap();

        let mut store = PresetStore::load(store.path()).unwrap();
        store.upsert("field", ConnectionPreset::new("192.168.144.30", "9000")).unwrap();
        store.save().unwrap();

        let loaded = PresetStore::load(store.path()).unwrap();
        assert_eq!(loaded.get("field"), Some(&ConnectionPreset::new("192.168.144.30", "9000")));
    }

    #[test]
    fn test_remove_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert("a", ConnectionPreset::new("1.1.1.1", "1")).unwrap();
        store.insert("b", ConnectionPreset::new("2.2.2.2", "2")).unwrap();
        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
        store.save().unwrap();

        let loaded = PresetStore::load(store.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.get("b").is_some());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert("field", ConnectionPreset::new("1.1.1.1", "8554")).unwrap();
        let result = store.insert("field", ConnectionPreset::new("2.2.2.2", "8554"));
        assert!(matches!(result, Err(GroundStationError::Preset(_))));
        assert_eq!(store.get("field").unwrap().ip, "1.1.1.1");
    }

    #[test]
    fn test_invalid_fields_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        assert!(store.insert("", ConnectionPreset::new("1.1.1.1", "1")).is_err());
        assert!(store.insert("a|b", ConnectionPreset::new("1.1.1.1", "1")).is_err());
        assert!(store.insert("ok", ConnectionPreset::new("  ", "1")).is_err());
        assert!(store.insert("ok", ConnectionPreset::new("1.1.1.1", "1\n2")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("connection_presets.txt");
        fs::write(&path, "good|192.168.144.25|8554\nbroken line\nalso|bad\n\nextra|1|2|3\nother|10.0.0.1|554\r\n").unwrap();

        let store = PresetStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("good"), Some(&ConnectionPreset::new("192.168.144.25", "8554")));
        assert_eq!(store.get("other"), Some(&ConnectionPreset::new("10.0.0.1", "554")));
    }

    #[test]
    fn test_saved_format() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.insert("field", ConnectionPreset::new("192.168.144.25", "8554")).unwrap();
        store.save().unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "field|192.168.144.25|8554\n");
    }

    #[test]
    fn test_stream_url() {
        assert_eq!(
            ConnectionPreset::new("192.168.144.25", "8554").stream_url(),
            "rtsp://192.168.144.25:8554/main.264"
        );
        assert_eq!(
            ConnectionPreset::new("ignored", "testsrc://320x240").stream_url(),
            "testsrc://320x240"
        );
    }
}
