//! # Video Module
//!
//! Live video for the dashboard.
//!
//! This module handles:
//! - Opening, reading and releasing video streams behind a trait seam
//! - Draining stale frames so the displayed frame is the newest one
//! - Compositing the telemetry info panel onto each frame

pub mod canvas;
pub mod overlay;
pub mod playback;
pub mod stream;

pub use overlay::OverlayCompositor;
pub use playback::Playback;
pub use stream::{BuiltinConnector, VideoConnector, VideoStream};

/// A decoded RGB video frame
pub type Frame = image::RgbImage;
