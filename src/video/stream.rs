//! Trait abstraction for video stream operations to enable testing
//!
//! A [`VideoConnector`] opens a stream handle from a URL; the returned
//! [`VideoStream`] is read frame by frame and released when dropped.

use image::Rgb;
use tracing::{debug, info};

use super::Frame;
use crate::error::{GroundStationError, Result};

/// URL scheme of the built-in synthetic source
pub const TEST_PATTERN_SCHEME: &str = "testsrc";

/// Default size of test-pattern frames
pub const DEFAULT_TEST_PATTERN_SIZE: (u32, u32) = (640, 480);

/// An open video stream handle
///
/// Dropping the value releases the underlying stream.
#[cfg_attr(test, mockall::automock)]
pub trait VideoStream {
    /// Advance past the next queued frame without decoding it.
    fn grab(&mut self) -> Result<()>;

    /// Decode and return the most recently grabbed frame.
    fn retrieve(&mut self) -> Result<Frame>;
}

/// Opens video streams from URLs
#[cfg_attr(test, mockall::automock)]
pub trait VideoConnector {
    /// Open the stream at `url` (`scheme://host:port/path`).
    fn open(&self, url: &str) -> Result<Box<dyn VideoStream>>;
}

/// Split `scheme://rest` into its scheme and remainder.
#[must_use]
pub fn split_scheme(url: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = url.split_once("://")?;
    (!scheme.is_empty()).then_some((scheme, rest))
}

/// Connector for the decoders built into this crate.
///
/// Only `testsrc://WIDTHxHEIGHT` is handled here; network streams need a
/// decoder-backed [`VideoConnector`] supplied by the embedding application.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinConnector;

impl VideoConnector for BuiltinConnector {
    fn open(&self, url: &str) -> Result<Box<dyn VideoStream>> {
        let (scheme, rest) = split_scheme(url)
            .ok_or_else(|| GroundStationError::VideoOpen(format!("invalid stream URL: {}", url)))?;

        if scheme != TEST_PATTERN_SCHEME {
            return Err(GroundStationError::VideoOpen(format!(
                "no decoder available for '{}' streams ({})",
                scheme, url
            )));
        }

        let (width, height) = parse_size(rest)?;
        info!("Opened test pattern stream {}x{}", width, height);
        Ok(Box::new(TestPatternStream::new(width, height)))
    }
}

fn parse_size(size: &str) -> Result<(u32, u32)> {
    let size = size.trim_end_matches('/');
    if size.is_empty() {
        return Ok(DEFAULT_TEST_PATTERN_SIZE);
    }

    let parsed = size
        .split_once('x')
        .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)));

    match parsed {
        Some((w, h)) if w > 0 && h > 0 && w <= 7680 && h <= 4320 => Ok((w, h)),
        _ => Err(GroundStationError::VideoOpen(format!(
            "invalid test pattern size '{}', expected WIDTHxHEIGHT",
            size
        ))),
    }
}

/// Synthetic stream of moving color bars
#[derive(Debug)]
pub struct TestPatternStream {
    width: u32,
    height: u32,
    frame_index: u64,
}

impl TestPatternStream {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, frame_index: 0 }
    }

    /// Number of frames grabbed so far.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl VideoStream for TestPatternStream {
    fn grab(&mut self) -> Result<()> {
        self.frame_index += 1;
        Ok(())
    }

    fn retrieve(&mut self) -> Result<Frame> {
        let shift = (self.frame_index % u64::from(self.width.max(1))) as u32;
        let width = self.width;
        Ok(Frame::from_fn(self.width, self.height, |x, y| {
            let band = ((x + shift) % width) * 8 / width.max(1);
            let level = (y * 255 / self.height.max(1)) as u8;
            match band {
                0 => Rgb([255, 255, 255]),
                1 => Rgb([255, 255, 0]),
                2 => Rgb([0, 255, 255]),
                3 => Rgb([0, 255, 0]),
                4 => Rgb([255, 0, 255]),
                5 => Rgb([255, 0, 0]),
                6 => Rgb([0, 0, 255]),
                _ => Rgb([level, level, level]),
            }
        }))
    }
}

impl Drop for TestPatternStream {
    fn drop(&mut self) {
        debug!("Released test pattern stream after {} frames", self.frame_index);
    }
}
