//! Text layout on a [`BitCanvas`]
//!
//! Characters are placed at the cursor and advance it. With wrapping enabled, a
//! character that would cross the right edge moves to the start of the next line
//! first; `'\n'` always starts a new line and `'\r'` is ignored.
//!
//! When no [`GlyphFont`] is bound the built-in 5×7 font is used: the cursor is the
//! top-left corner of a 6×8 cell. With a bound font the cursor sits on the
//! baseline and glyph offsets are relative to it. Characters the bound font does
//! not cover are neither drawn nor advanced over; the built-in font always
//! advances, drawing a blank cell for codes it has no glyph for.
//!
//! [`text_bounds`](BitCanvas::text_bounds) runs the same placement without drawing,
//! which is what the centered and right-justified writes are built on.
//!
//! ## Example
//!
//! ```
//! use core::fmt::Write;
//! use epd_status::{BitCanvas, Color};
//!
//! let mut buffer = [0xFFu8; 400 * 300 / 8];
//! let mut canvas = match BitCanvas::new(400, 300, &mut buffer[..]) {
//!     Ok(canvas) => canvas,
//!     Err(_) => return,
//! };
//!
//! let bounds = canvas.text_bounds("A", 0, 0);
//! assert_eq!((bounds.w, bounds.h), (6, 8));
//!
//! canvas.set_text_size(2);
//! canvas.write_centered(200, 100, "42%");
//! canvas.set_cursor(0, 0);
//! let _ = write!(canvas, "{}: {:.1}kWh", "PV", 12.34);
//! ```

use core::fmt;

use crate::canvas::BitCanvas;
use crate::color::Color;
use crate::font::{
    BUILTIN_GLYPH_WIDTH, BUILTIN_X_ADVANCE, BUILTIN_Y_ADVANCE, Glyph, GlyphFont, builtin_glyph,
    remap_legacy,
};

/// Bounding box of a laid out string
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBounds {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub w: u32,
    /// Height in pixels
    pub h: u32,
}

/// Where a character lands once the cursor logic ran
enum Placement<'f> {
    Builtin {
        x: i32,
        y: i32,
        columns: Option<&'static [u8; 5]>,
    },
    Bound {
        x: i32,
        y: i32,
        glyph: &'f Glyph,
        bitmap: &'f [u8],
    },
}

struct BoundsAccumulator {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl BoundsAccumulator {
    fn new() -> Self {
        Self {
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
        }
    }

    fn add(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.min_x = self.min_x.min(x1);
        self.min_y = self.min_y.min(y1);
        self.max_x = self.max_x.max(x2);
        self.max_y = self.max_y.max(y2);
    }

    fn finish(self, x: i32, y: i32) -> TextBounds {
        let mut bounds = TextBounds { x, y, w: 0, h: 0 };
        if self.max_x >= self.min_x {
            bounds.x = self.min_x;
            bounds.w = self.max_x.abs_diff(self.min_x).saturating_add(1);
        }
        if self.max_y >= self.min_y {
            bounds.y = self.min_y;
            bounds.h = self.max_y.abs_diff(self.min_y).saturating_add(1);
        }
        bounds
    }
}

impl<'f, B> BitCanvas<'f, B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Bind a proportional font, or `None` for the built-in font
    pub fn set_font(&mut self, font: Option<&'f GlyphFont<'f>>) {
        self.font = font;
    }

    /// Move the text cursor
    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    /// Current text cursor
    pub fn cursor(&self) -> (i32, i32) {
        (self.cursor_x, self.cursor_y)
    }

    /// Text color with a transparent background
    pub fn set_text_color(&mut self, color: Color) {
        self.text_color = color;
        self.text_bg = None;
    }

    /// Text color with an opaque background
    ///
    /// Only the built-in font paints backgrounds; bound fonts stay transparent.
    pub fn set_text_color_bg(&mut self, color: Color, bg: Color) {
        self.text_color = color;
        self.text_bg = Some(bg);
    }

    /// Uniform text magnification (minimum 1)
    pub fn set_text_size(&mut self, size: u8) {
        self.set_text_size_xy(size, size);
    }

    /// Per-axis text magnification (minimum 1 each)
    pub fn set_text_size_xy(&mut self, size_x: u8, size_y: u8) {
        self.text_size_x = size_x.max(1);
        self.text_size_y = size_y.max(1);
    }

    /// Enable or disable wrapping at the right edge
    pub fn set_text_wrap(&mut self, wrap: bool) {
        self.wrap = wrap;
    }

    /// Remap Latin-1 code points to code page 437 before glyph lookup
    pub fn set_legacy_charset(&mut self, enabled: bool) {
        self.legacy_charset = enabled;
    }

    fn line_advance(&self) -> i32 {
        let per_line = self.font.map_or(BUILTIN_Y_ADVANCE, |font| font.y_advance);
        i32::from(self.text_size_y) * i32::from(per_line)
    }

    fn wraps(&self, x: i32, extent: i32) -> bool {
        self.wrap && x.saturating_add(extent) > i32::from(self.width())
    }

    /// Advance `cursor` over `c`, returning where to draw it
    fn place(&self, c: char, cursor: &mut (i32, i32)) -> Option<Placement<'f>> {
        if c == '\n' {
            cursor.0 = 0;
            cursor.1 = cursor.1.saturating_add(self.line_advance());
            return None;
        }
        if c == '\r' {
            return None;
        }

        let code = if self.legacy_charset {
            remap_legacy(u32::from(c))
        } else {
            u32::from(c)
        };
        let size_x = i32::from(self.text_size_x);

        let Some(font) = self.font else {
            let advance = size_x * i32::from(BUILTIN_X_ADVANCE);
            if self.wraps(cursor.0, advance) {
                cursor.0 = 0;
                cursor.1 = cursor.1.saturating_add(self.line_advance());
            }
            let (x, y) = *cursor;
            cursor.0 = cursor.0.saturating_add(advance);
            return Some(Placement::Builtin {
                x,
                y,
                columns: builtin_glyph(code),
            });
        };

        let glyph = font.glyph(code)?;
        let bitmap = font.glyph_bitmap(glyph)?;
        if glyph.width > 0 && glyph.height > 0 {
            let extent = size_x * (i32::from(glyph.x_offset) + i32::from(glyph.width));
            if self.wraps(cursor.0, extent) {
                cursor.0 = 0;
                cursor.1 = cursor.1.saturating_add(self.line_advance());
            }
        }
        let (x, y) = *cursor;
        cursor.0 = cursor.0.saturating_add(size_x * i32::from(glyph.x_advance));
        Some(Placement::Bound {
            x,
            y,
            glyph,
            bitmap,
        })
    }

    /// Write one character at the cursor
    pub fn write_char(&mut self, c: char) {
        let mut cursor = self.cursor();
        let placement = self.place(c, &mut cursor);
        self.set_cursor(cursor.0, cursor.1);

        match placement {
            Some(Placement::Builtin { x, y, columns }) => self.draw_builtin(x, y, columns),
            Some(Placement::Bound {
                x,
                y,
                glyph,
                bitmap,
            }) => self.draw_glyph(x, y, glyph, bitmap),
            None => {}
        }
    }

    /// Write a string at the cursor
    pub fn write_str(&mut self, s: &str) {
        for c in s.chars() {
            self.write_char(c);
        }
    }

    /// Move the cursor to (x, y) and write `s`
    pub fn write_at(&mut self, x: i32, y: i32, s: &str) {
        self.set_cursor(x, y);
        self.write_str(s);
    }

    /// Bounding box `s` would cover if written from (x, y)
    ///
    /// Nothing is drawn and the cursor is not moved. An empty box is reported at
    /// (x, y) with zero size.
    pub fn text_bounds(&self, s: &str, x: i32, y: i32) -> TextBounds {
        let mut cursor = (x, y);
        let mut acc = BoundsAccumulator::new();
        let size_x = i32::from(self.text_size_x);
        let size_y = i32::from(self.text_size_y);

        for c in s.chars() {
            match self.place(c, &mut cursor) {
                Some(Placement::Builtin { x, y, .. }) => acc.add(
                    x,
                    y,
                    x.saturating_add(size_x * i32::from(BUILTIN_X_ADVANCE) - 1),
                    y.saturating_add(size_y * i32::from(BUILTIN_Y_ADVANCE) - 1),
                ),
                Some(Placement::Bound { x, y, glyph, .. }) => {
                    if glyph.width == 0 || glyph.height == 0 {
                        continue;
                    }
                    let x1 = x.saturating_add(size_x * i32::from(glyph.x_offset));
                    let y1 = y.saturating_add(size_y * i32::from(glyph.y_offset));
                    acc.add(
                        x1,
                        y1,
                        x1.saturating_add(size_x * i32::from(glyph.width) - 1),
                        y1.saturating_add(size_y * i32::from(glyph.height) - 1),
                    );
                }
                None => {}
            }
        }
        acc.finish(x, y)
    }

    /// Write `s` horizontally centered on `cx`
    ///
    /// `y` is the cursor line, as for [`write_at`](Self::write_at).
    pub fn write_centered(&mut self, cx: i32, y: i32, s: &str) {
        let bounds = self.text_bounds(s, 0, y);
        let half = i32::try_from(bounds.w / 2).unwrap_or(i32::MAX);
        self.write_at(cx.saturating_sub(bounds.x).saturating_sub(half), y, s);
    }

    /// Write `s` so its bounding box ends just left of `right`
    pub fn write_right_justified(&mut self, right: i32, y: i32, s: &str) {
        let bounds = self.text_bounds(s, 0, y);
        let width = i32::try_from(bounds.w).unwrap_or(i32::MAX);
        self.write_at(right.saturating_sub(bounds.x).saturating_sub(width), y, s);
    }

    fn scaled_pixel(&mut self, x: i32, y: i32, color: Color) {
        let size_x = i32::from(self.text_size_x);
        let size_y = i32::from(self.text_size_y);
        if size_x == 1 && size_y == 1 {
            self.set_pixel(x, y, color);
        } else {
            self.fill_rect(x, y, size_x, size_y, color);
        }
    }

    fn draw_builtin(&mut self, x: i32, y: i32, columns: Option<&'static [u8; 5]>) {
        let size_x = i32::from(self.text_size_x);
        let size_y = i32::from(self.text_size_y);
        let cell_w = size_x * i32::from(BUILTIN_X_ADVANCE);
        let cell_h = size_y * i32::from(BUILTIN_Y_ADVANCE);
        if x >= i32::from(self.width())
            || y >= i32::from(self.height())
            || x.saturating_add(cell_w) <= 0
            || y.saturating_add(cell_h) <= 0
        {
            return;
        }

        let color = self.text_color;
        let bg = self.text_bg;
        let blank = [0u8; 5];
        let columns = columns.unwrap_or(&blank);

        for (i, column) in (0..i32::from(BUILTIN_GLYPH_WIDTH)).zip(columns.iter()) {
            let mut line = *column;
            for j in 0..i32::from(BUILTIN_Y_ADVANCE) {
                let px = x + i * size_x;
                let py = y + j * size_y;
                if line & 1 != 0 {
                    self.scaled_pixel(px, py, color);
                } else if let Some(bg) = bg {
                    self.scaled_pixel(px, py, bg);
                }
                line >>= 1;
            }
        }
        if let Some(bg) = bg {
            // Spacing column
            let px = x + i32::from(BUILTIN_GLYPH_WIDTH) * size_x;
            self.fill_rect(px, y, size_x, cell_h, bg);
        }
    }

    fn draw_glyph(&mut self, x: i32, y: i32, glyph: &Glyph, bitmap: &[u8]) {
        let size_x = i32::from(self.text_size_x);
        let size_y = i32::from(self.text_size_y);
        let color = self.text_color;
        let x_offset = i32::from(glyph.x_offset);
        let y_offset = i32::from(glyph.y_offset);

        let mut bytes = bitmap.iter();
        let mut bits = 0u8;
        let mut bit = 0u32;
        for yy in 0..i32::from(glyph.height) {
            for xx in 0..i32::from(glyph.width) {
                if bit & 7 == 0 {
                    bits = bytes.next().copied().unwrap_or(0);
                }
                bit += 1;
                if bits & 0x80 != 0 {
                    self.scaled_pixel(
                        x.saturating_add((x_offset + xx) * size_x),
                        y.saturating_add((y_offset + yy) * size_y),
                        color,
                    );
                }
                bits <<= 1;
            }
        }
    }
}

impl<B> fmt::Write for BitCanvas<'_, B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn write_str(&mut self, s: &str) -> fmt::Result {
        BitCanvas::write_str(self, s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        BitCanvas::write_char(self, c);
        Ok(())
    }
}
