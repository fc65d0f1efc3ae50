//! # Video Playback Controller
//!
//! Owns the video stream handle and enforces its lifecycle:
//!
//! - The stream is opened fresh on every toggle-on and on reconnect.
//! - It is released on toggle-off, before a reconnect, on any read failure,
//!   on shutdown and when the controller is dropped.
//! - A read failure ends the session; the user must start playback again.
//!
//! Before each displayed frame up to `drain_frames` queued frames are grabbed
//! and discarded, trading completeness for the lowest possible latency.

use tracing::{debug, error, info, warn};

use super::stream::{VideoConnector, VideoStream};
use super::Frame;
use crate::error::{GroundStationError, Result};

/// Default number of queued frames skipped before each retrieved frame
pub const DEFAULT_DRAIN_FRAMES: usize = 5;

/// Playback controller for one configured stream URL
pub struct Playback<C> {
    connector: C,
    url: String,
    drain_frames: usize,
    stream: Option<Box<dyn VideoStream>>,
}

impl<C> std::fmt::Debug for Playback<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playback")
            .field("url", &self.url)
            .field("drain_frames", &self.drain_frames)
            .field("playing", &self.stream.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: VideoConnector> Playback<C> {
    /// Create a stopped controller for `url`.
    pub fn new<S: Into<String>>(connector: C, url: S) -> Self {
        Self {
            connector,
            url: url.into(),
            drain_frames: DEFAULT_DRAIN_FRAMES,
            stream: None,
        }
    }

    /// Set how many queued frames are discarded before each retrieved frame.
    #[must_use]
    pub fn drain_frames(mut self, count: usize) -> Self {
        self.drain_frames = count;
        self
    }

    /// Stream URL used by the next start.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether a stream is currently held.
    pub fn is_playing(&self) -> bool {
        self.stream.is_some()
    }

    /// Start playback if stopped, stop it if playing.
    ///
    /// Returns the new playing state.
    ///
    /// # Errors
    ///
    /// Returns [`GroundStationError::VideoOpen`] if the stream cannot be
    /// opened; playback is then left stopped.
    pub fn toggle(&mut self) -> Result<bool> {
        if self.is_playing() {
            self.stop();
        } else {
            self.start()?;
        }
        Ok(self.is_playing())
    }

    /// Open a fresh stream. Does nothing if already playing.
    ///
    /// # Errors
    ///
    /// Returns [`GroundStationError::VideoOpen`] if the stream cannot be opened.
    pub fn start(&mut self) -> Result<()> {
        if self.is_playing() {
            return Ok(());
        }

        info!("Starting stream {}", self.url);
        match self.connector.open(&self.url) {
            Ok(stream) => {
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                error!("Failed to start stream {}: {}", self.url, e);
                Err(match e {
                    GroundStationError::VideoOpen(_) => e,
                    other => GroundStationError::VideoOpen(other.to_string()),
                })
            }
        }
    }

    /// Release the stream if one is held.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            info!("Stopped stream {}", self.url);
        }
    }

    /// Switch to `url`, releasing any current stream before opening the new one.
    ///
    /// # Errors
    ///
    /// Returns [`GroundStationError::VideoOpen`] if the new stream cannot be
    /// opened; playback is then left stopped.
    pub fn reconnect<S: Into<String>>(&mut self, url: S) -> Result<()> {
        self.stop();
        self.url = url.into();
        self.start()
    }

    /// Drain stale frames and retrieve the newest one.
    ///
    /// # Errors
    ///
    /// Returns [`GroundStationError::VideoRead`] if playback is stopped or the
    /// stream fails. A stream failure also stops playback and releases the
    /// stream; there is no automatic retry.
    pub fn next_frame(&mut self) -> Result<Frame> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(GroundStationError::VideoRead("playback is stopped".to_string()));
        };

        let result = (0..self.drain_frames)
            .try_for_each(|_| stream.grab())
            .and_then(|()| stream.retrieve());

        match result {
            Ok(frame) => Ok(frame),
            Err(e) => {
                warn!("Couldn't read frame from {}: {}", self.url, e);
                self.stream = None;
                debug!("Released stream {} after read failure", self.url);
                Err(match e {
                    GroundStationError::VideoRead(_) => e,
                    other => GroundStationError::VideoRead(other.to_string()),
                })
            }
        }
    }

    /// Release the stream regardless of state.
    pub fn shutdown(&mut self) {
        self.stop();
    }
}

impl<C> Drop for Playback<C> {
    fn drop(&mut self) {
        if self.stream.take().is_some() {
            debug!("Released stream {} on drop", self.url);
        }
    }
}
