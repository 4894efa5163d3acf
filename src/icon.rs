//! Status icons
//!
//! Icons are X bitmaps: rows top to bottom, each row padded to whole bytes, the
//! leftmost pixel of a byte in its least significant bit.

use crate::canvas::BitCanvas;
use crate::color::Color;

/// Monochrome icon in X bitmap layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XBitmap {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Packed rows, `ceil(width / 8)` bytes each
    pub data: &'static [u8],
}

impl XBitmap {
    /// Bytes per row
    pub const fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }
}

/// Wi-Fi connected
pub const WIFI: XBitmap = XBitmap {
    width: 21,
    height: 16,
    data: &[
        0x00, 0x1f, 0x00, 0xe0, 0xff, 0x00, 0xf8, 0xf1, 0x03, 0x1e, 0x00, 0x0f, 0x07, 0x00, 0x1c,
        0xc3, 0x7f, 0x18, 0xf0, 0xff, 0x01, 0x78, 0xc0, 0x03, 0x18, 0x00, 0x03, 0x80, 0x3f, 0x00,
        0xc0, 0x7f, 0x00, 0xc0, 0x60, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0e, 0x00, 0x00, 0x0e, 0x00,
        0x00, 0x0e, 0x00,
    ],
};

/// Warning triangle
pub const WARNING: XBitmap = XBitmap {
    width: 21,
    height: 20,
    data: &[
        0x00, 0x0e, 0x00, 0x00, 0x1b, 0x00, 0x00, 0x11, 0x00, 0x80, 0x31, 0x00, 0x80, 0x20, 0x00,
        0xc0, 0x60, 0x00, 0x40, 0x40, 0x00, 0x60, 0xc4, 0x00, 0x20, 0x84, 0x00, 0x30, 0x84, 0x01,
        0x10, 0x04, 0x01, 0x18, 0x04, 0x03, 0x08, 0x04, 0x02, 0x0c, 0x04, 0x06, 0x04, 0x00, 0x04,
        0x06, 0x04, 0x0c, 0x02, 0x0e, 0x08, 0x03, 0x04, 0x18, 0x01, 0x00, 0x10, 0xff, 0xff, 0x1f,
    ],
};

/// Charging flash
pub const FLASH: XBitmap = XBitmap {
    width: 15,
    height: 19,
    data: &[
        0x00, 0x04, 0x00, 0x06, 0x00, 0x07, 0x80, 0x03, 0xc0, 0x02, 0x60, 0x02, 0x30, 0x02, 0x18,
        0x7f, 0x0c, 0x60, 0x06, 0x30, 0x03, 0x18, 0x7f, 0x0c, 0x20, 0x06, 0x20, 0x03, 0xa0, 0x01,
        0xe0, 0x00, 0x70, 0x00, 0x30, 0x00, 0x10, 0x00,
    ],
};

/// Battery, full
pub const BATTERY_FULL: XBitmap = XBitmap {
    width: 20,
    height: 11,
    data: &[
        0xfe, 0xff, 0x01, 0x03, 0x00, 0x03, 0xfd, 0xff, 0x02, 0xfd, 0xff, 0x0e, 0xfd, 0xff, 0x0e,
        0xfd, 0xff, 0x0e, 0xfd, 0xff, 0x0e, 0xfd, 0xff, 0x0e, 0xfd, 0xff, 0x02, 0x03, 0x00, 0x03,
        0xfe, 0xff, 0x01,
    ],
};

/// Battery, half
pub const BATTERY_HALF: XBitmap = XBitmap {
    width: 20,
    height: 11,
    data: &[
        0xfe, 0xff, 0x01, 0x03, 0x00, 0x03, 0xfd, 0x01, 0x02, 0xfd, 0x01, 0x0e, 0xfd, 0x01, 0x0e,
        0xfd, 0x01, 0x0e, 0xfd, 0x01, 0x0e, 0xfd, 0x01, 0x0e, 0xfd, 0x01, 0x02, 0x03, 0x00, 0x03,
        0xfe, 0xff, 0x01,
    ],
};

/// Battery, empty
pub const BATTERY_EMPTY: XBitmap = XBitmap {
    width: 20,
    height: 11,
    data: &[
        0xfe, 0xff, 0x01, 0x03, 0x00, 0x03, 0x01, 0x00, 0x02, 0x01, 0x00, 0x0e, 0x01, 0x00, 0x0e,
        0x01, 0x00, 0x0e, 0x01, 0x00, 0x0e, 0x01, 0x00, 0x0e, 0x01, 0x00, 0x02, 0x03, 0x00, 0x03,
        0xfe, 0xff, 0x01,
    ],
};

impl<B> BitCanvas<'_, B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Draw the set pixels of `icon` with its top-left corner at (x, y)
    pub fn draw_icon(&mut self, x: i32, y: i32, icon: &XBitmap, color: Color) {
        self.draw_xbitmap(
            x,
            y,
            icon.data,
            i32::from(icon.width),
            i32::from(icon.height),
            color,
        );
    }
}
