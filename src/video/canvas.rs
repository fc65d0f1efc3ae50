//! `embedded-graphics` draw target over an RGB frame buffer.

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use image::Rgb;

use super::Frame;

/// Borrows a [`Frame`] so `embedded-graphics` primitives and text can draw on it.
///
/// Pixels outside the frame are silently dropped.
pub struct FrameCanvas<'a> {
    frame: &'a mut Frame,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(frame: &'a mut Frame) -> Self {
        Self { frame }
    }
}

impl OriginDimensions for FrameCanvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.frame.width(), self.frame.height())
    }
}

impl DrawTarget for FrameCanvas<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.frame.dimensions();
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < width && y < height {
                self.frame.put_pixel(x, y, Rgb([color.r(), color.g(), color.b()]));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_size_matches_frame() {
        let mut frame = Frame::new(32, 24);
        let canvas = FrameCanvas::new(&mut frame);
        assert_eq!(canvas.size(), Size::new(32, 24));
    }

    #[test]
    fn test_out_of_bounds_pixels_are_dropped() {
        let mut frame = Frame::new(4, 4);
        let mut canvas = FrameCanvas::new(&mut frame);
        Rectangle::new(Point::new(-2, -2), Size::new(10, 10))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::new(1, 2, 3)))
            .draw(&mut canvas)
            .unwrap();

        assert!(frame.pixels().all(|p| *p == Rgb([1, 2, 3])));
    }
}
