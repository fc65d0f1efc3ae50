//! # Ground Station
//!
//! Wires the telemetry source, position trail, video playback and overlay
//! together around a single latest snapshot.
//!
//! The event loop drives it through two independent cadences:
//! [`GroundStation::on_telemetry_tick`] refreshes the snapshot and the trail,
//! [`GroundStation::on_frame_tick`] shows the newest video frame annotated with
//! whatever snapshot is current at that moment.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::Result;
use crate::map::TrailTracker;
use crate::readouts::DashboardReadouts;
use crate::telemetry::recorder::SnapshotRecorder;
use crate::telemetry::source::SimulationRanges;
use crate::telemetry::{TelemetryRecord, TelemetrySource};
use crate::video::{BuiltinConnector, Frame, OverlayCompositor, Playback, VideoConnector};

/// Owner of all dashboard state
#[derive(Debug)]
pub struct GroundStation<C = BuiltinConnector, R = StdRng> {
    source: TelemetrySource<R>,
    trail: TrailTracker,
    overlay: OverlayCompositor,
    playback: Playback<C>,
    recorder: Option<SnapshotRecorder>,
    latest: Option<TelemetryRecord>,
    frame: Option<Frame>,
    telemetry_ticks: u64,
    frames_shown: u64,
}

impl GroundStation<BuiltinConnector, StdRng> {
    /// Build a station from configuration using the built-in video decoders.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the snapshot recorder is enabled and its
    /// directory cannot be created.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_connector(config, BuiltinConnector)
    }
}

impl<C: VideoConnector> GroundStation<C, StdRng> {
    /// Build a station from configuration with a custom video connector.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the snapshot recorder is enabled and its
    /// directory cannot be created.
    pub fn with_connector(config: &Config, connector: C) -> Result<Self> {
        let source = TelemetrySource::new(&config.telemetry.record_path)
            .tail_window(config.telemetry.tail_window_bytes)
            .simulation_ranges(SimulationRanges::from(&config.telemetry.simulation));
        let playback = Playback::new(connector, config.video.url.clone())
            .drain_frames(config.video.drain_frames);

        let mut station = Self::new(source, playback).trail_capacity(config.trail.max_points);
        if config.recorder.enabled {
            station = station.recorder(SnapshotRecorder::from_config(&config.recorder)?);
        }
        Ok(station)
    }
}

impl<C: VideoConnector, R: Rng> GroundStation<C, R> {
    /// Assemble a station from its parts, with the default trail capacity and
    /// no recorder.
    pub fn new(source: TelemetrySource<R>, playback: Playback<C>) -> Self {
        Self {
            source,
            trail: TrailTracker::new(),
            overlay: OverlayCompositor::new(),
            playback,
            recorder: None,
            latest: None,
            frame: None,
            telemetry_ticks: 0,
            frames_shown: 0,
        }
    }

    /// Replace the trail with an empty one retaining up to `max_points` fixes.
    #[must_use]
    pub fn trail_capacity(mut self, max_points: usize) -> Self {
        self.trail = TrailTracker::with_capacity(max_points);
        self
    }

    /// Record every snapshot with `recorder`.
    #[must_use]
    pub fn recorder(mut self, recorder: SnapshotRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Poll telemetry, publish the snapshot and extend the trail.
    ///
    /// Only live snapshots reach the trail; simulated positions never become
    /// fixes. Never fails; recorder errors are logged and the snapshot is
    /// still kept.
    pub fn on_telemetry_tick(&mut self) -> &TelemetryRecord {
        let record = self.source.poll();
        if record.is_live() {
            self.trail.update(record.fields.latitude, record.fields.longitude);
        }

        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.record(&record) {
                error!("Failed to record telemetry snapshot: {}", e);
            }
        }

        self.telemetry_ticks += 1;
        self.latest.insert(record)
    }

    /// Fetch the newest video frame and annotate it with the latest snapshot.
    ///
    /// Returns `Ok(None)` when playback is stopped. Before the first telemetry
    /// tick the frame is shown without an info panel.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GroundStationError::VideoRead`] if the stream
    /// fails. Playback is stopped and the stream released; the last good
    /// frame stays available through [`GroundStation::last_frame`].
    pub fn on_frame_tick(&mut self) -> Result<Option<&Frame>> {
        if !self.playback.is_playing() {
            return Ok(None);
        }

        let mut frame = self.playback.next_frame()?;
        match self.latest.as_ref() {
            Some(record) => self.overlay.annotate_in_place(&mut frame, record),
            None => debug!("No telemetry yet, showing frame without overlay"),
        }

        self.frames_shown += 1;
        Ok(Some(&*self.frame.insert(frame)))
    }

    /// Start playback if stopped, stop it if playing. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GroundStationError::VideoOpen`] if the stream
    /// cannot be opened.
    pub fn toggle_playback(&mut self) -> Result<bool> {
        self.playback.toggle()
    }

    /// Switch the video source to `url`, releasing the current stream first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GroundStationError::VideoOpen`] if the new
    /// stream cannot be opened.
    pub fn reconnect<S: Into<String>>(&mut self, url: S) -> Result<()> {
        self.playback.reconnect(url)
    }

    /// Forget the travelled path. The current position is kept.
    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// The snapshot from the most recent telemetry tick.
    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.latest.as_ref()
    }

    pub fn trail(&self) -> &TrailTracker {
        &self.trail
    }

    /// The most recently displayed frame.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn playback(&self) -> &Playback<C> {
        &self.playback
    }

    /// Readouts for the latest snapshot, once one exists.
    pub fn readouts(&self) -> Option<DashboardReadouts> {
        self.latest
            .as_ref()
            .map(|record| DashboardReadouts::new(record, self.trail.current_fix()))
    }

    /// Number of telemetry ticks handled so far.
    pub fn telemetry_ticks(&self) -> u64 {
        self.telemetry_ticks
    }

    /// Number of frames displayed so far.
    pub fn frames_shown(&self) -> u64 {
        self.frames_shown
    }

    /// Release the video stream.
    pub fn shutdown(&mut self) {
        if self.playback.is_playing() {
            warn!("Shutting down with video playing, releasing stream");
        }
        self.playback.shutdown();
    }
}
