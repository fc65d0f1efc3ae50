//! # Video Frame Overlay Compositor
//!
//! Draws the telemetry info panel onto a decoded video frame.
//!
//! ## Layout
//!
//! ```text
//! (5,5) ┌──────────────────────────────────────────────┐
//!       │ Long: 12.35° | Lat: -6.79° | Alt: 100.50m     │  baseline y=30
//!       │ Roll: 1.00° | Pitch: 2.00° | Yaw: 3.00°       │  baseline y=60
//!       └──────────────────────────────────────────────┘ (400,80)
//! ```
//!
//! Inside the panel every pixel is darkened to 70% (a 30% black blend) and the
//! text is drawn in a fixed light color. Text is clipped to the panel, so the
//! frame outside the panel is never touched. Drawing happens in place; no
//! buffer is retained between calls.

use embedded_graphics::mono_font::iso_8859_1::FONT_7X13;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};

use super::canvas::FrameCanvas;
use super::Frame;
use crate::telemetry::TelemetryRecord;

/// Top-left corner of the info panel
pub const PANEL_TOP_LEFT: (u32, u32) = (5, 5);

/// Bottom-right corner of the info panel (inclusive)
pub const PANEL_BOTTOM_RIGHT: (u32, u32) = (400, 80);

/// Fraction of the original pixel kept inside the panel
pub const PANEL_KEEP: f32 = 0.7;

/// Text color (light grey)
pub const TEXT_COLOR: Rgb888 = Rgb888::new(206, 212, 214);

/// Baseline origin of the position line
pub const POSITION_ORIGIN: (i32, i32) = (10, 30);

/// Baseline origin of the orientation line
pub const ORIENTATION_ORIGIN: (i32, i32) = (10, 60);

/// Annotates frames with a telemetry snapshot
#[derive(Debug, Clone, Copy)]
pub struct OverlayCompositor {
    text_color: Rgb888,
}

impl Default for OverlayCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayCompositor {
    #[must_use]
    pub fn new() -> Self {
        Self { text_color: TEXT_COLOR }
    }

    /// Annotate `frame` with `record` and hand it back.
    ///
    /// The returned frame has the same dimensions and reuses the same buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use ground_station::telemetry::{LinkStatus, Provenance, RecordFields, TelemetryRecord};
    /// use ground_station::video::{Frame, OverlayCompositor};
    ///
    /// let record = TelemetryRecord::new(RecordFields::default(), LinkStatus::default(), Provenance::Live);
    /// let frame = OverlayCompositor::new().annotate(Frame::new(640, 480), &record);
    /// assert_eq!(frame.dimensions(), (640, 480));
    /// ```
    #[must_use]
    pub fn annotate(&self, mut frame: Frame, record: &TelemetryRecord) -> Frame {
        self.annotate_in_place(&mut frame, record);
        frame
    }

    /// Annotate `frame` in place with `record`.
    pub fn annotate_in_place(&self, frame: &mut Frame, record: &TelemetryRecord) {
        let Some(panel) = panel_bounds(frame.width(), frame.height()) else {
            return;
        };

        darken(frame, &panel);

        let style = MonoTextStyle::new(&FONT_7X13, self.text_color);
        let clip = Rectangle::with_corners(
            Point::new(panel.x0 as i32, panel.y0 as i32),
            Point::new(panel.x1 as i32, panel.y1 as i32),
        );
        let mut canvas = FrameCanvas::new(frame);
        let mut clipped = canvas.clipped(&clip);

        for (text, origin) in [
            (position_text(record), POSITION_ORIGIN),
            (orientation_text(record), ORIENTATION_ORIGIN),
        ] {
            // Drawing onto a frame canvas is infallible
            let _ = Text::with_baseline(&text, Point::new(origin.0, origin.1), style, Baseline::Alphabetic)
                .draw(&mut clipped);
        }
    }
}

/// First overlay line: `Long: … | Lat: … | Alt: …m`
#[must_use]
pub fn position_text(record: &TelemetryRecord) -> String {
    let f = &record.fields;
    format!("Long: {:.2}° | Lat: {:.2}° | Alt: {:.2}m", f.longitude, f.latitude, f.altitude)
}

/// Second overlay line: `Roll: …° | Pitch: …° | Yaw: …°`
#[must_use]
pub fn orientation_text(record: &TelemetryRecord) -> String {
    let f = &record.fields;
    format!("Roll: {:.2}° | Pitch: {:.2}° | Yaw: {:.2}°", f.roll, f.pitch, f.yaw)
}

/// Inclusive pixel bounds of the panel within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelBounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PanelBounds {
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }
}

/// Panel rectangle clipped to a `width` x `height` frame, or `None` if the
/// frame is too small to show any of it.
#[must_use]
pub fn panel_bounds(width: u32, height: u32) -> Option<PanelBounds> {
    let (x0, y0) = PANEL_TOP_LEFT;
    if width <= x0 || height <= y0 {
        return None;
    }

    Some(PanelBounds {
        x0,
        y0,
        x1: PANEL_BOTTOM_RIGHT.0.min(width - 1),
        y1: PANEL_BOTTOM_RIGHT.1.min(height - 1),
    })
}

fn darken(frame: &mut Frame, panel: &PanelBounds) {
    for y in panel.y0..=panel.y1 {
        for x in panel.x0..=panel.x1 {
            let pixel = frame.get_pixel_mut(x, y);
            for channel in pixel.0.iter_mut() {
                *channel = darkened(*channel);
            }
        }
    }
}

/// Value of one channel after the 30% black blend.
#[must_use]
pub fn darkened(channel: u8) -> u8 {
    (f32::from(channel) * PANEL_KEEP).round() as u8
}
