//! Graphics support via embedded-graphics
//!
//! [`BitCanvas`] implements [`DrawTarget`] so embedded-graphics primitives, fonts
//! and images can be mixed with the canvas' own drawing and text routines.
//! Pixels outside the canvas are discarded, like every other canvas operation.
//!
//! ## Example
//!
//! ```rust
//! use embedded_graphics::{
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle, Rectangle},
//! };
//! use epd_status::{BitCanvas, Color};
//!
//! let mut buffer = [0xFFu8; 400 * 300 / 8];
//! let mut canvas = match BitCanvas::new(400, 300, &mut buffer[..]) {
//!     Ok(canvas) => canvas,
//!     Err(_) => return,
//! };
//!
//! let _ = Circle::new(Point::new(10, 10), 40)
//!     .into_styled(PrimitiveStyle::with_stroke(Color::Black, 2))
//!     .draw(&mut canvas);
//! let _ = Rectangle::new(Point::new(100, 10), Size::new(60, 30))
//!     .into_styled(PrimitiveStyle::with_fill(Color::Black))
//!     .draw(&mut canvas);
//! assert_eq!(canvas.pixel(120, 20), Some(Color::Black));
//! ```

use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    primitives::Rectangle,
};

use crate::canvas::BitCanvas;
use crate::color::Color;

impl<B> DrawTarget for BitCanvas<'_, B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_area(
            area.top_left.x.into(),
            area.top_left.y.into(),
            area.size.width.into(),
            area.size.height.into(),
            color,
        );
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen(color);
        Ok(())
    }
}

impl<B> OriginDimensions for BitCanvas<'_, B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        Size::new(u32::from(self.width()), u32::from(self.height()))
    }
}
