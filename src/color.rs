//! Monochrome color type
//!
//! The panel stores one bit per pixel with an inverted convention: a cleared bit
//! is a black (foreground) pixel and a set bit is a white (background) pixel.
//! An all-`0xFF` framebuffer is therefore a blank screen.
//!
//! | Color | Bit | Fill byte |
//! |-------|-----|-----------|
//! | Black | 0   | 0x00      |
//! | White | 1   | 0xFF      |
//!
//! ## Example
//!
//! ```
//! use epd_status::Color;
//!
//! assert_eq!(Color::from(1u8), Color::Black);
//! assert_eq!(Color::from(0u8), Color::White);
//! assert_eq!(Color::White.fill_byte(), 0xFF);
//! ```

/// Pixel color of a monochrome e-paper panel
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Color {
    /// Foreground (ink) pixels
    Black,
    /// Background (paper) pixels
    #[default]
    White,
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::prelude::PixelColor for Color {
    type Raw = embedded_graphics_core::pixelcolor::raw::RawU1;
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::BinaryColor> for Color {
    fn from(color: embedded_graphics_core::pixelcolor::BinaryColor) -> Self {
        match color {
            embedded_graphics_core::pixelcolor::BinaryColor::On => Self::Black,
            embedded_graphics_core::pixelcolor::BinaryColor::Off => Self::White,
        }
    }
}

/// Numeric colors follow the GFX convention: any non-zero value is foreground.
impl From<u8> for Color {
    fn from(value: u8) -> Self {
        if value == 0 { Self::White } else { Self::Black }
    }
}

impl Color {
    /// Whether this color clears the framebuffer bit
    pub fn is_foreground(self) -> bool {
        self == Self::Black
    }

    /// Byte value of eight consecutive pixels of this color
    ///
    /// ```
    /// use epd_status::Color;
    ///
    /// assert_eq!(Color::Black.fill_byte(), 0x00);
    /// assert_eq!(Color::White.fill_byte(), 0xFF);
    /// ```
    pub fn fill_byte(self) -> u8 {
        match self {
            Self::Black => 0x00,
            Self::White => 0xFF,
        }
    }

    /// The opposite color
    pub fn inverted(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}
