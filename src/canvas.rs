//! Monochrome framebuffer and drawing primitives
//!
//! [`BitCanvas`] wraps a packed 1-bit buffer (row-major, MSB first) and rasterizes
//! lines, rectangles, circles, triangles, rounded rectangles and bitmaps into it.
//! Every primitive clips against the canvas bounds, so drawing never fails and
//! never touches memory outside the buffer.
//!
//! Pixel bits follow the panel's inverted convention, see [`Color`].
//!
//! ## Example
//!
//! ```
//! use epd_status::{BitCanvas, Color};
//!
//! let mut buffer = [0xFFu8; 400 * 300 / 8];
//! let mut canvas = match BitCanvas::new(400, 300, &mut buffer[..]) {
//!     Ok(canvas) => canvas,
//!     Err(_) => return,
//! };
//!
//! canvas.set_pixel(10, 10, Color::Black);
//! canvas.draw_round_rect(285, 75, 115, 225, 10, Color::Black);
//! assert_eq!(canvas.buffer()[501], 0xDF);
//! ```

use core::mem::swap;

use crate::color::Color;
use crate::error::CanvasError;
use crate::font::GlyphFont;

/// Upper-left quadrant for the circle helpers
pub const QUADRANT_TOP_LEFT: u8 = 0x1;
/// Upper-right quadrant for the circle helpers
pub const QUADRANT_TOP_RIGHT: u8 = 0x2;
/// Lower-right quadrant for the circle helpers
pub const QUADRANT_BOTTOM_RIGHT: u8 = 0x4;
/// Lower-left quadrant for the circle helpers
pub const QUADRANT_BOTTOM_LEFT: u8 = 0x8;
/// All four quadrants
pub const QUADRANT_ALL: u8 = 0xF;

/// Lower half for [`BitCanvas::fill_circle_helper`]
pub const HALF_LOWER: u8 = 0x1;
/// Upper half for [`BitCanvas::fill_circle_helper`]
pub const HALF_UPPER: u8 = 0x2;

/// Packed monochrome framebuffer with drawing state
///
/// The buffer length is fixed at construction to exactly `ceil(width * height / 8)`
/// bytes. Text state (cursor, colors, size, wrap, charset, font) lives here too; the
/// text operations are implemented in [`crate::text`].
#[derive(Debug)]
pub struct BitCanvas<'f, B> {
    width: u16,
    height: u16,
    buffer: B,
    pub(crate) cursor_x: i32,
    pub(crate) cursor_y: i32,
    pub(crate) text_color: Color,
    pub(crate) text_bg: Option<Color>,
    pub(crate) text_size_x: u8,
    pub(crate) text_size_y: u8,
    pub(crate) wrap: bool,
    pub(crate) legacy_charset: bool,
    pub(crate) font: Option<&'f GlyphFont<'f>>,
}

impl<'f, B> BitCanvas<'f, B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Wrap `buffer` as a `width`×`height` canvas
    ///
    /// The existing buffer content is kept.
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::InvalidDimensions` for a zero width or height and
    /// `CanvasError::BufferSize` if the buffer length is not exactly one frame.
    pub fn new(width: u16, height: u16, buffer: B) -> Result<Self, CanvasError> {
        let required = frame_len(width, height)?;
        let provided = buffer.as_ref().len();
        if provided != required {
            return Err(CanvasError::BufferSize { required, provided });
        }
        Ok(Self {
            width,
            height,
            buffer,
            cursor_x: 0,
            cursor_y: 0,
            text_color: Color::Black,
            text_bg: None,
            text_size_x: 1,
            text_size_y: 1,
            wrap: true,
            legacy_charset: false,
            font: None,
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Raw framebuffer, ready for [`PanelDriver::display_full`](crate::driver::PanelDriver::display_full)
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_ref()
    }

    /// Consume the canvas and return the buffer
    pub fn into_inner(self) -> B {
        self.buffer
    }

    fn bit_position(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        let index = y as usize * usize::from(self.width) + x as usize;
        Some((index / 8, 0x80 >> (index % 8)))
    }

    /// Set one pixel; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some((byte, mask)) = self.bit_position(x, y) else {
            return;
        };
        let Some(cell) = self.buffer.as_mut().get_mut(byte) else {
            return;
        };
        if color.is_foreground() {
            *cell &= !mask;
        } else {
            *cell |= mask;
        }
    }

    /// Sample one pixel, `None` outside the canvas
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let (byte, mask) = self.bit_position(x, y)?;
        let cell = self.buffer.as_ref().get(byte)?;
        Some(if cell & mask == 0 {
            Color::Black
        } else {
            Color::White
        })
    }

    /// Paint the whole canvas
    pub fn fill_screen(&mut self, color: Color) {
        self.buffer.as_mut().fill(color.fill_byte());
    }

    /// Draw a line including both endpoints
    ///
    /// Axis-aligned lines are routed to the fast variants; everything else uses
    /// Bresenham's algorithm with the axes transposed for steep slopes.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        self.line(x0.into(), y0.into(), x1.into(), y1.into(), color);
    }

    fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        if x0 == x1 {
            let (top, bottom) = if y0 > y1 { (y1, y0) } else { (y0, y1) };
            self.vspan(x0, top, bottom - top + 1, color);
        } else if y0 == y1 {
            let (left, right) = if x0 > x1 { (x1, x0) } else { (x0, x1) };
            self.hspan(left, y0, right - left + 1, color);
        } else {
            self.bresenham(x0, y0, x1, y1, color);
        }
    }

    /// Bresenham walk over the visible part of the major axis
    ///
    /// The error term at the first visible step is computed directly, so the
    /// pixels are the ones a walk from the first endpoint would set.
    fn bresenham(&mut self, mut x0: i64, mut y0: i64, mut x1: i64, mut y1: i64, color: Color) {
        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            swap(&mut x0, &mut y0);
            swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            swap(&mut x0, &mut x1);
            swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let ystep = if y0 < y1 { 1 } else { -1 };
        let limit = if steep { self.height } else { self.width };
        let Some((first, last)) = clip(x0, x1, limit) else {
            return;
        };

        let half = i128::from(dx / 2);
        let skipped = i128::from(first - x0) * i128::from(dy);
        let taken = ceil_div(skipped - half, i128::from(dx));
        let mut err = (half - skipped + taken * i128::from(dx)) as i64;
        let mut y = y0 + ystep * taken as i64;

        for x in first..=last {
            if steep {
                self.put(y, x, color);
            } else {
                self.put(x, y, color);
            }
            err -= dy;
            if err < 0 {
                y += ystep;
                err += dx;
            }
        }
    }

    /// Horizontal line of `w` pixels starting at (x, y); negative `w` extends left
    pub fn draw_fast_hline(&mut self, x: i32, y: i32, w: i32, color: Color) {
        self.hspan(x.into(), y.into(), w.into(), color);
    }

    /// Vertical line of `h` pixels starting at (x, y); negative `h` extends up
    pub fn draw_fast_vline(&mut self, x: i32, y: i32, h: i32, color: Color) {
        self.vspan(x.into(), y.into(), h.into(), color);
    }

    fn hspan(&mut self, x: i64, y: i64, w: i64, color: Color) {
        let (x, w) = normalize(x, w);
        if w == 0 || y < 0 || y >= i64::from(self.height) {
            return;
        }
        if let Some((first, last)) = clip(x, x + w - 1, self.width) {
            for px in first..=last {
                self.put(px, y, color);
            }
        }
    }

    fn vspan(&mut self, x: i64, y: i64, h: i64, color: Color) {
        let (y, h) = normalize(y, h);
        if h == 0 || x < 0 || x >= i64::from(self.width) {
            return;
        }
        if let Some((first, last)) = clip(y, y + h - 1, self.height) {
            for py in first..=last {
                self.put(x, py, color);
            }
        }
    }

    /// Plot with wide coordinates; anything beyond `i32` is off the canvas
    fn put(&mut self, x: i64, y: i64, color: Color) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.set_pixel(x, y, color);
        }
    }

    /// Rectangle outline
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        let (x, w) = normalize(x.into(), w.into());
        let (y, h) = normalize(y.into(), h.into());
        if w == 0 || h == 0 {
            return;
        }
        self.hspan(x, y, w, color);
        self.hspan(x, y + h - 1, w, color);
        self.vspan(x, y, h, color);
        self.vspan(x + w - 1, y, h, color);
    }

    /// Filled rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.fill_area(x.into(), y.into(), w.into(), h.into(), color);
    }

    /// Filled rectangle in wide coordinates; only visible rows are visited
    pub(crate) fn fill_area(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) {
        let (y, h) = normalize(y, h);
        if h == 0 {
            return;
        }
        if let Some((top, bottom)) = clip(y, y + h - 1, self.height) {
            for row in top..=bottom {
                self.hspan(x, row, w, color);
            }
        }
    }

    /// Circle outline centered at (x0, y0)
    pub fn draw_circle(&mut self, x0: i32, y0: i32, r: i32, color: Color) {
        if r < 0 {
            return;
        }
        let (x0, y0, r) = (i64::from(x0), i64::from(y0), i64::from(r));
        self.put(x0, y0 + r, color);
        self.put(x0, y0 - r, color);
        self.put(x0 + r, y0, color);
        self.put(x0 - r, y0, color);
        self.arcs(x0, y0, r, QUADRANT_ALL, color);
    }

    /// Quarter-circle arcs selected by a `QUADRANT_*` mask
    ///
    /// The four axis points are not drawn; [`draw_circle`](Self::draw_circle) adds them.
    pub fn draw_circle_helper(&mut self, x0: i32, y0: i32, r: i32, quadrants: u8, color: Color) {
        self.arcs(x0.into(), y0.into(), r.into(), quadrants, color);
    }

    /// Midpoint arcs, evaluated only at steps that can reach the canvas
    ///
    /// Every point of step `x` lies on column `x0 ± x` or on row `y0 ± x`.
    fn arcs(&mut self, x0: i64, y0: i64, r: i64, quadrants: u8, color: Color) {
        let steps = octant_steps(r);
        if steps == 0 {
            return;
        }
        let windows = visible_offsets(x0, self.width)
            .into_iter()
            .chain(visible_offsets(y0, self.height));

        for (lo, hi) in windows {
            for x in lo.max(1)..=hi.min(steps) {
                let y = arc_y(r, x);
                if quadrants & QUADRANT_BOTTOM_RIGHT != 0 {
                    self.put(x0 + x, y0 + y, color);
                    self.put(x0 + y, y0 + x, color);
                }
                if quadrants & QUADRANT_TOP_RIGHT != 0 {
                    self.put(x0 + x, y0 - y, color);
                    self.put(x0 + y, y0 - x, color);
                }
                if quadrants & QUADRANT_BOTTOM_LEFT != 0 {
                    self.put(x0 - y, y0 + x, color);
                    self.put(x0 - x, y0 + y, color);
                }
                if quadrants & QUADRANT_TOP_LEFT != 0 {
                    self.put(x0 - y, y0 - x, color);
                    self.put(x0 - x, y0 - y, color);
                }
            }
        }
    }

    /// Filled circle centered at (x0, y0)
    pub fn fill_circle(&mut self, x0: i32, y0: i32, r: i32, color: Color) {
        if r < 0 {
            return;
        }
        let (x0, y0, r) = (i64::from(x0), i64::from(y0), i64::from(r));
        self.hspan(x0 - r, y0, 2 * r + 1, color);
        self.fill_arcs(x0, y0, r, HALF_LOWER | HALF_UPPER, 0, color);
    }

    /// Horizontal spans of a filled half circle
    ///
    /// `halves` selects `HALF_LOWER` and/or `HALF_UPPER`. Each span is widened by
    /// `delta` pixels to the right, which stretches the arcs into the rounded
    /// corners of a box `delta` pixels wider than the circle.
    pub fn fill_circle_helper(
        &mut self,
        x0: i32,
        y0: i32,
        r: i32,
        halves: u8,
        delta: i32,
        color: Color,
    ) {
        self.fill_arcs(x0.into(), y0.into(), r.into(), halves, delta.into(), color);
    }

    /// Midpoint fill, looked up per visible row
    ///
    /// Step `x` spans rows `y0 ± x` while `x <= y`. When the arc drops a row, the
    /// previous step also spans rows `y0 ± y_prev`; that step is the last one
    /// still at or above `y_prev`.
    fn fill_arcs(&mut self, x0: i64, y0: i64, r: i64, halves: u8, delta: i64, color: Color) {
        let steps = octant_steps(r);
        if steps == 0 {
            return;
        }
        let delta = delta + 1;
        let rows = visible_offsets(y0, self.height);

        for (lo, hi) in rows {
            for x in lo.max(1)..=hi.min(steps) {
                let y = arc_y(r, x);
                if x <= y {
                    self.half_spans(x0 - y, y0, x, 2 * y + delta, halves, color);
                }
            }
        }

        let lowest = arc_y(r, steps - 1);
        for (lo, hi) in rows {
            for row in lo.max(lowest)..=hi.min(r) {
                let step = last_step_at_or_above(r, steps, row);
                if arc_y(r, step) == row && arc_y(r, step + 1) != row {
                    self.half_spans(x0 - step, y0, row, 2 * step + delta, halves, color);
                }
            }
        }
    }

    fn half_spans(&mut self, x: i64, y0: i64, offset: i64, w: i64, halves: u8, color: Color) {
        if halves & HALF_LOWER != 0 {
            self.hspan(x, y0 + offset, w, color);
        }
        if halves & HALF_UPPER != 0 {
            self.hspan(x, y0 - offset, w, color);
        }
    }

    /// Triangle outline, edges drawn in input order
    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
    ) {
        self.draw_line(x0, y0, x1, y1, color);
        self.draw_line(x1, y1, x2, y2, color);
        self.draw_line(x2, y2, x0, y0, color);
    }

    /// Filled triangle
    ///
    /// Vertices are sorted by y, then spans between the two active edges are filled
    /// top to bottom. The lower half starts at the middle vertex; a flat-bottomed
    /// triangle includes its last row in the upper half instead. Only visible rows
    /// are computed.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_triangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        color: Color,
    ) {
        let mut vertices =
            [(x0, y0), (x1, y1), (x2, y2)].map(|(x, y)| (i64::from(x), i64::from(y)));
        vertices.sort_unstable_by_key(|&(_, y)| y);
        let [(x0, y0), (x1, y1), (x2, y2)] = vertices;

        if y0 == y2 {
            let a = x0.min(x1).min(x2);
            let b = x0.max(x1).max(x2);
            self.hspan(a, y0, b - a + 1, color);
            return;
        }

        let bottom = i64::from(self.height) - 1;
        let last = if y1 == y2 { y1 } else { y1 - 1 };

        for y in y0.max(0)..=last.min(bottom) {
            let a = x0 + edge_offset(x1 - x0, y - y0, y1 - y0);
            let b = x0 + edge_offset(x2 - x0, y - y0, y2 - y0);
            self.span(a, b, y, color);
        }
        for y in (last + 1).max(0)..=y2.min(bottom) {
            let a = x1 + edge_offset(x2 - x1, y - y1, y2 - y1);
            let b = x0 + edge_offset(x2 - x0, y - y0, y2 - y0);
            self.span(a, b, y, color);
        }
    }

    fn span(&mut self, a: i64, b: i64, y: i64, color: Color) {
        let (a, b) = if a > b { (b, a) } else { (a, b) };
        self.hspan(a, y, b - a + 1, color);
    }

    /// Rounded rectangle outline
    ///
    /// The radius is clamped to half of the shorter side.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_round_rect(&mut self, x: i32, y: i32, w: i32, h: i32, r: i32, color: Color) {
        let (x, w) = normalize(x.into(), w.into());
        let (y, h) = normalize(y.into(), h.into());
        if w == 0 || h == 0 {
            return;
        }
        let r = i64::from(r).clamp(0, w.min(h) / 2);
        self.hspan(x + r, y, w - 2 * r, color);
        self.hspan(x + r, y + h - 1, w - 2 * r, color);
        self.vspan(x, y + r, h - 2 * r, color);
        self.vspan(x + w - 1, y + r, h - 2 * r, color);
        self.arcs(x + r, y + r, r, QUADRANT_TOP_LEFT, color);
        self.arcs(x + w - r - 1, y + r, r, QUADRANT_TOP_RIGHT, color);
        self.arcs(x + w - r - 1, y + h - r - 1, r, QUADRANT_BOTTOM_RIGHT, color);
        self.arcs(x + r, y + h - r - 1, r, QUADRANT_BOTTOM_LEFT, color);
    }

    /// Filled rounded rectangle
    ///
    /// The radius is clamped to half of the shorter side.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_round_rect(&mut self, x: i32, y: i32, w: i32, h: i32, r: i32, color: Color) {
        let (x, w) = normalize(x.into(), w.into());
        let (y, h) = normalize(y.into(), h.into());
        if w == 0 || h == 0 {
            return;
        }
        let r = i64::from(r).clamp(0, w.min(h) / 2);
        self.fill_area(x, y + r, w, h - 2 * r, color);
        self.fill_arcs(x + r, y + r, r, HALF_UPPER, w - 2 * r - 1, color);
        self.fill_arcs(x + r, y + h - r - 1, r, HALF_LOWER, w - 2 * r - 1, color);
    }

    /// Blit a row-major, MSB-first bitmap with rows padded to whole bytes
    ///
    /// Set bits are drawn in `color`; clear bits are drawn in `bg` when given and
    /// left untouched otherwise. A bitmap shorter than `ceil(w/8) * h` bytes is
    /// not drawn.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_bitmap(
        &mut self,
        x: i32,
        y: i32,
        bitmap: &[u8],
        w: i32,
        h: i32,
        color: Color,
        bg: Option<Color>,
    ) {
        let Some(byte_width) = bitmap_row_bytes(bitmap, w, h) else {
            return;
        };
        let (x, y) = (i64::from(x), i64::from(y));
        for j in 0..h {
            let row = &bitmap[j as usize * byte_width..];
            let mut bits = 0u8;
            for i in 0..w {
                if i & 7 == 0 {
                    bits = row[i as usize / 8];
                } else {
                    bits <<= 1;
                }
                let (px, py) = (x + i64::from(i), y + i64::from(j));
                if bits & 0x80 != 0 {
                    self.put(px, py, color);
                } else if let Some(bg) = bg {
                    self.put(px, py, bg);
                }
            }
        }
    }

    /// Blit an XBM image (rows padded to whole bytes, least significant bit first)
    ///
    /// Only set bits are drawn. A bitmap shorter than `ceil(w/8) * h` bytes is
    /// not drawn.
    pub fn draw_xbitmap(&mut self, x: i32, y: i32, bitmap: &[u8], w: i32, h: i32, color: Color) {
        let Some(byte_width) = bitmap_row_bytes(bitmap, w, h) else {
            return;
        };
        let (x, y) = (i64::from(x), i64::from(y));
        for j in 0..h {
            let row = &bitmap[j as usize * byte_width..];
            let mut bits = 0u8;
            for i in 0..w {
                if i & 7 == 0 {
                    bits = row[i as usize / 8];
                } else {
                    bits >>= 1;
                }
                if bits & 0x01 != 0 {
                    self.put(x + i64::from(i), y + i64::from(j), color);
                }
            }
        }
    }
}

#[cfg(feature = "alloc")]
impl<'f> BitCanvas<'f, alloc::vec::Vec<u8>> {
    /// Allocate a blank (all background) canvas
    ///
    /// # Errors
    ///
    /// Returns `CanvasError::InvalidDimensions` for a zero width or height.
    pub fn new_owned(width: u16, height: u16) -> Result<Self, CanvasError> {
        let len = frame_len(width, height)?;
        Self::new(width, height, alloc::vec![Color::White.fill_byte(); len])
    }
}

fn frame_len(width: u16, height: u16) -> Result<usize, CanvasError> {
    if width == 0 || height == 0 {
        return Err(CanvasError::InvalidDimensions { width, height });
    }
    Ok((usize::from(width) * usize::from(height)).div_ceil(8))
}

/// Move the origin so the extent is non-negative
fn normalize(origin: i64, extent: i64) -> (i64, i64) {
    if extent < 0 {
        (origin + extent + 1, -extent)
    } else {
        (origin, extent)
    }
}

/// Clip the inclusive range `first..=last` to `0..limit`
fn clip(first: i64, last: i64, limit: u16) -> Option<(i64, i64)> {
    let first = first.max(0);
    let last = last.min(i64::from(limit) - 1);
    (first <= last).then_some((first, last))
}

/// Offsets `d` for which `center + d` or `center - d` lies in `0..limit`
fn visible_offsets(center: i64, limit: u16) -> [(i64, i64); 2] {
    let limit = i64::from(limit);
    [(-center, limit - 1 - center), (center - limit + 1, center)]
}

fn ceil_div(n: i128, d: i128) -> i128 {
    -((-n).div_euclid(d))
}

/// `dx * done / dy`, truncated toward zero
fn edge_offset(dx: i64, done: i64, dy: i64) -> i64 {
    (i128::from(dx) * i128::from(done) / i128::from(dy)) as i64
}

/// Largest `y` with `x² + y² - y < r²`, or 0 if there is none
fn octant_row(r: i64, x: i64) -> i64 {
    let d = i128::from(r) * i128::from(r) - i128::from(x) * i128::from(x);
    if d <= 0 {
        return 0;
    }
    let root = ((4 * d - 3) as u128).isqrt();
    ((root + 1) / 2) as i64
}

/// Row offset of the midpoint circle after `x` steps
///
/// The closed form holds for every step but the last, which may leave the
/// octant; deciding the step from the previous row covers that one too.
fn arc_y(r: i64, x: i64) -> i64 {
    if x <= 0 {
        return r;
    }
    let prev = i128::from(octant_row(r, x - 1));
    let (r, x) = (i128::from(r), i128::from(x));
    if x * x + prev * prev - prev - r * r >= 0 {
        (prev - 1) as i64
    } else {
        prev as i64
    }
}

/// Number of steps the midpoint circle takes for radius `r`
fn octant_steps(r: i64) -> i64 {
    if r <= 0 {
        return 0;
    }
    // Steps continue while x < y: true at 0, false at r
    let (mut lo, mut hi) = (0, r);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if mid < arc_y(r, mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo + 1
}

/// Last step before `steps` whose row offset is still at least `row`
fn last_step_at_or_above(r: i64, steps: i64, row: i64) -> i64 {
    let (mut lo, mut hi) = (0, steps);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if arc_y(r, mid) >= row {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Bytes per bitmap row, or `None` if the bitmap cannot hold `w`×`h` pixels
fn bitmap_row_bytes(bitmap: &[u8], w: i32, h: i32) -> Option<usize> {
    if w <= 0 || h <= 0 {
        return None;
    }
    let byte_width = (w as usize).div_ceil(8);
    let required = byte_width.checked_mul(h as usize)?;
    (bitmap.len() >= required).then_some(byte_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn blank(width: u16, height: u16) -> BitCanvas<'static, Vec<u8>> {
        let len = (usize::from(width) * usize::from(height)).div_ceil(8);
        BitCanvas::new(width, height, vec![0xFF; len]).unwrap()
    }

    fn black_pixels(canvas: &BitCanvas<'_, Vec<u8>>) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for y in 0..i32::from(canvas.height()) {
            for x in 0..i32::from(canvas.width()) {
                if canvas.pixel(x, y) == Some(Color::Black) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    fn draw_shape(canvas: &mut BitCanvas<'_, Vec<u8>>, shape: u8, p: [i32; 6], r: i32) {
        let [x0, y0, x1, y1, x2, y2] = p;
        let c = Color::Black;
        match shape {
            0 => canvas.draw_line(x0, y0, x1, y1, c),
            1 => canvas.draw_fast_hline(x0, y0, x1, c),
            2 => canvas.draw_fast_vline(x0, y0, y1, c),
            3 => canvas.draw_rect(x0, y0, x1, y1, c),
            4 => canvas.fill_rect(x0, y0, x1, y1, c),
            5 => canvas.draw_circle(x0, y0, r, c),
            6 => canvas.fill_circle(x0, y0, r, c),
            7 => canvas.fill_circle_helper(x0, y0, r, HALF_UPPER, x1, c),
            8 => canvas.fill_triangle(x0, y0, x1, y1, x2, y2, c),
            9 => canvas.draw_round_rect(x0, y0, x1, y1, r, c),
            10 => canvas.fill_round_rect(x0, y0, x1, y1, r, c),
            11 => canvas.draw_xbitmap(x0, y0, &[0xA5; 6], 20, 2, c),
            12 => canvas.draw_triangle(x0, y0, x1, y1, x2, y2, c),
            13 => canvas.draw_bitmap(x0, y0, &[0x5A; 6], 20, 2, c, Some(Color::White)),
            _ => {
                canvas.set_text_wrap(false);
                canvas.set_text_size(r.rem_euclid(4) as u8);
                canvas.write_at(x0, y0, "Hg\n%");
            }
        }
    }

    #[test]
    fn test_set_pixel_clears_expected_bit() {
        let mut canvas = blank(400, 300);
        canvas.set_pixel(10, 10, Color::Black);
        assert_eq!(canvas.buffer()[501], 0xDF);
        assert_eq!(canvas.buffer().iter().filter(|b| **b != 0xFF).count(), 1);
    }

    #[test]
    fn test_new_rejects_wrong_buffer_length() {
        let result = BitCanvas::new(400, 300, vec![0xFFu8; 15_001]);
        assert!(matches!(
            result,
            Err(CanvasError::BufferSize {
                required: 15_000,
                provided: 15_001
            })
        ));
        assert!(matches!(
            BitCanvas::new(0, 300, Vec::new()),
            Err(CanvasError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_non_byte_aligned_canvas_packs_continuously() {
        let mut canvas = blank(10, 2);
        assert_eq!(canvas.buffer().len(), 3);
        canvas.set_pixel(0, 1, Color::Black);
        // Pixel index 10 -> byte 1, bit offset 2
        assert_eq!(canvas.buffer()[1], 0xDF);
    }

    #[test]
    fn test_fill_rect_full_screen_is_foreground() {
        let mut canvas = blank(400, 300);
        canvas.fill_rect(0, 0, 400, 300, Color::Black);
        assert!(canvas.buffer().iter().all(|b| *b == 0x00));
        assert_eq!(canvas.pixel(399, 299), Some(Color::Black));
    }

    #[test]
    fn test_fill_screen() {
        let mut canvas = blank(16, 4);
        canvas.fill_screen(Color::Black);
        assert!(canvas.buffer().iter().all(|b| *b == 0x00));
        canvas.fill_screen(Color::White);
        assert!(canvas.buffer().iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_pixel_outside_is_none() {
        let canvas = blank(16, 4);
        assert_eq!(canvas.pixel(-1, 0), None);
        assert_eq!(canvas.pixel(16, 0), None);
        assert_eq!(canvas.pixel(0, 4), None);
        assert_eq!(canvas.pixel(15, 3), Some(Color::White));
    }

    #[test]
    fn test_fast_lines_accept_negative_extent() {
        let mut canvas = blank(16, 16);
        canvas.draw_fast_hline(5, 3, -3, Color::Black);
        assert_eq!(black_pixels(&canvas), vec![(3, 3), (4, 3), (5, 3)]);

        let mut canvas = blank(16, 16);
        canvas.draw_fast_vline(2, 4, -2, Color::Black);
        assert_eq!(black_pixels(&canvas), vec![(2, 3), (2, 4)]);
    }

    #[test]
    fn test_fast_hline_clips() {
        let mut canvas = blank(16, 4);
        canvas.draw_fast_hline(-10, 1, 100, Color::Black);
        assert_eq!(black_pixels(&canvas).len(), 16);
    }

    #[test]
    fn test_extreme_extents_clip_without_overflow() {
        let mut canvas = blank(16, 8);
        canvas.fill_rect(1, 1, 4, i32::MAX, Color::Black);
        assert_eq!(black_pixels(&canvas).len(), 4 * 7);

        let mut canvas = blank(16, 8);
        canvas.draw_fast_hline(10, 1, i32::MAX, Color::Black);
        assert_eq!(
            black_pixels(&canvas),
            vec![(10, 1), (11, 1), (12, 1), (13, 1), (14, 1), (15, 1)]
        );

        // Origin moves to 0 and the extent to 2^31
        let mut canvas = blank(16, 8);
        canvas.draw_fast_vline(3, i32::MAX, i32::MIN, Color::Black);
        assert_eq!(black_pixels(&canvas).len(), 8);

        let mut canvas = blank(16, 8);
        canvas.fill_rect(i32::MAX, i32::MAX, i32::MIN, i32::MIN, Color::Black);
        assert!(canvas.buffer().iter().all(|b| *b == 0x00));

        let mut canvas = blank(16, 8);
        canvas.draw_rect(i32::MIN, i32::MIN, i32::MAX, i32::MAX, Color::Black);
        canvas.fill_round_rect(i32::MIN, 0, i32::MAX, i32::MAX, i32::MAX, Color::Black);
        canvas.draw_round_rect(i32::MIN, i32::MIN, i32::MIN, i32::MIN, i32::MIN, Color::Black);
        assert!(canvas.buffer().iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_huge_line_crosses_canvas() {
        let mut canvas = blank(16, 8);
        canvas.draw_line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, Color::Black);
        let expected: Vec<_> = (0..8).map(|i| (i, i)).collect();
        assert_eq!(black_pixels(&canvas), expected);
    }

    #[test]
    fn test_huge_circle_arc_crosses_canvas() {
        let r = 1_000_000_000;
        let mut canvas = blank(16, 8);
        canvas.draw_circle(8, 4 + r, r, Color::Black);
        let expected: Vec<_> = (0..16).map(|x| (x, 4)).collect();
        assert_eq!(black_pixels(&canvas), expected);

        let mut canvas = blank(16, 8);
        canvas.fill_circle(8, 4 + r, r, Color::Black);
        assert_eq!(black_pixels(&canvas).len(), 16 * 4);
        assert_eq!(canvas.pixel(8, 3), Some(Color::White));
    }

    #[test]
    fn test_huge_triangle_covers_canvas() {
        let mut canvas = blank(16, 8);
        canvas.fill_triangle(i32::MIN, -10, i32::MAX, -10, 0, i32::MAX, Color::Black);
        assert!(canvas.buffer().iter().all(|b| *b == 0x00));
    }

    #[test]
    fn test_line_steep_and_shallow() {
        let mut canvas = blank(16, 16);
        canvas.draw_line(0, 0, 3, 9, Color::Black);
        let pixels = black_pixels(&canvas);
        // One pixel per row for a steep line
        assert_eq!(pixels.len(), 10);
        assert!(pixels.contains(&(0, 0)));
        assert!(pixels.contains(&(3, 9)));

        let mut canvas = blank(16, 16);
        canvas.draw_line(12, 2, 1, 5, Color::Black);
        let pixels = black_pixels(&canvas);
        assert_eq!(pixels.len(), 12);
        assert!(pixels.contains(&(12, 2)));
        assert!(pixels.contains(&(1, 5)));
    }

    #[test]
    fn test_rect_outline() {
        let mut canvas = blank(16, 16);
        canvas.draw_rect(2, 2, 4, 3, Color::Black);
        let pixels = black_pixels(&canvas);
        assert_eq!(pixels.len(), 10);
        assert!(!pixels.contains(&(3, 3)));
        assert!(pixels.contains(&(5, 4)));
    }

    #[test]
    fn test_circle_is_symmetric() {
        let mut canvas = blank(32, 32);
        canvas.draw_circle(15, 15, 7, Color::Black);
        let pixels = black_pixels(&canvas);
        for (x, y) in &pixels {
            assert!(pixels.contains(&(30 - x, *y)));
            assert!(pixels.contains(&(*x, 30 - y)));
            assert!(pixels.contains(&(*y, *x)));
        }
        assert!(pixels.contains(&(15, 8)));
        assert!(pixels.contains(&(22, 15)));
        assert!(!pixels.contains(&(15, 15)));
    }

    #[test]
    fn test_circle_helper_quadrant_mask() {
        let mut canvas = blank(32, 32);
        canvas.draw_circle_helper(15, 15, 7, QUADRANT_TOP_LEFT, Color::Black);
        let pixels = black_pixels(&canvas);
        assert!(!pixels.is_empty());
        assert!(pixels.iter().all(|(x, y)| *x < 15 && *y < 15));
    }

    #[test]
    fn test_fill_circle_covers_outline() {
        let mut outline = blank(32, 32);
        outline.draw_circle(15, 15, 9, Color::Black);
        let mut filled = blank(32, 32);
        filled.fill_circle(15, 15, 9, Color::Black);
        let filled_pixels = black_pixels(&filled);
        for p in black_pixels(&outline) {
            assert!(filled_pixels.contains(&p), "missing {p:?}");
        }
        assert!(filled_pixels.contains(&(15, 15)));
        assert_eq!(filled.pixel(15, 5), Some(Color::White));
    }

    #[test]
    fn test_fill_triangle_flat_cases() {
        let mut canvas = blank(16, 16);
        canvas.fill_triangle(1, 1, 9, 1, 5, 6, Color::Black);
        assert_eq!(canvas.pixel(5, 6), Some(Color::Black));
        assert_eq!(canvas.pixel(1, 1), Some(Color::Black));
        assert_eq!(canvas.pixel(9, 1), Some(Color::Black));

        let mut canvas = blank(16, 16);
        canvas.fill_triangle(5, 1, 1, 6, 9, 6, Color::Black);
        assert_eq!(canvas.pixel(5, 1), Some(Color::Black));
        for x in 1..=9 {
            assert_eq!(canvas.pixel(x, 6), Some(Color::Black));
        }

        let mut canvas = blank(16, 16);
        canvas.fill_triangle(7, 3, 2, 3, 12, 3, Color::Black);
        assert_eq!(black_pixels(&canvas).len(), 11);
    }

    #[test]
    fn test_fill_triangle_has_no_empty_rows() {
        let mut canvas = blank(32, 32);
        canvas.fill_triangle(3, 2, 28, 11, 10, 29, Color::Black);
        for y in 2..=29 {
            assert!((0..32).any(|x| canvas.pixel(x, y) == Some(Color::Black)));
        }
    }

    #[test]
    fn test_round_rect_radius_clamped() {
        let mut big = blank(32, 32);
        big.fill_round_rect(2, 2, 10, 6, 50, Color::Black);
        let mut exact = blank(32, 32);
        exact.fill_round_rect(2, 2, 10, 6, 3, Color::Black);
        assert_eq!(big.buffer(), exact.buffer());
    }

    #[test]
    fn test_fill_round_rect_corners_open() {
        let mut canvas = blank(64, 64);
        canvas.fill_round_rect(5, 5, 40, 30, 8, Color::Black);
        assert_eq!(canvas.pixel(5, 5), Some(Color::White));
        assert_eq!(canvas.pixel(44, 34), Some(Color::White));
        assert_eq!(canvas.pixel(25, 5), Some(Color::Black));
        assert_eq!(canvas.pixel(5, 20), Some(Color::Black));
        assert_eq!(canvas.pixel(44, 20), Some(Color::Black));
        assert_eq!(canvas.pixel(25, 34), Some(Color::Black));
    }

    #[test]
    fn test_round_rect_outline_inside_fill() {
        let mut outline = blank(64, 64);
        outline.draw_round_rect(5, 5, 40, 30, 8, Color::Black);
        let mut filled = blank(64, 64);
        filled.fill_round_rect(5, 5, 40, 30, 8, Color::Black);
        let filled_pixels = black_pixels(&filled);
        for p in black_pixels(&outline) {
            assert!(filled_pixels.contains(&p), "missing {p:?}");
        }
    }

    #[test]
    fn test_draw_bitmap_with_background() {
        let mut canvas = blank(16, 4);
        canvas.fill_screen(Color::Black);
        // 10 px wide, rows padded to 2 bytes
        let bitmap = [0b1000_0000, 0b0100_0000, 0x00, 0x00];
        canvas.draw_bitmap(0, 0, &bitmap, 10, 2, Color::Black, Some(Color::White));
        assert_eq!(canvas.pixel(0, 0), Some(Color::Black));
        assert_eq!(canvas.pixel(1, 0), Some(Color::White));
        assert_eq!(canvas.pixel(9, 0), Some(Color::Black));
        assert_eq!(canvas.pixel(9, 1), Some(Color::White));
        assert_eq!(canvas.pixel(10, 0), Some(Color::Black));
    }

    #[test]
    fn test_draw_xbitmap_lsb_first() {
        let mut canvas = blank(16, 4);
        let bitmap = [0b0000_0001, 0b0000_0001, 0b1000_0000, 0x00];
        canvas.draw_xbitmap(2, 1, &bitmap, 9, 2, Color::Black);
        assert_eq!(black_pixels(&canvas), vec![(2, 1), (10, 1), (9, 2)]);
    }

    #[test]
    fn test_short_bitmap_not_drawn() {
        let mut canvas = blank(16, 4);
        canvas.draw_bitmap(0, 0, &[0xFF], 16, 2, Color::Black, None);
        canvas.draw_xbitmap(0, 0, &[0xFF, 0xFF, 0xFF], 16, 2, Color::Black);
        assert!(canvas.buffer().iter().all(|b| *b == 0xFF));
    }

    proptest! {
        #[test]
        fn prop_set_pixel_round_trip(x in 0i32..400, y in 0i32..300, seed in any::<u8>()) {
            let mut canvas = BitCanvas::new(400, 300, vec![seed; 15_000]).unwrap();
            let before = canvas.buffer().to_vec();
            let original = canvas.pixel(x, y).unwrap();
            canvas.set_pixel(x, y, Color::Black);
            canvas.set_pixel(x, y, Color::White);
            canvas.set_pixel(x, y, original);
            prop_assert_eq!(canvas.buffer(), &before[..]);
        }

        #[test]
        fn prop_far_off_canvas_draws_leave_buffer_unchanged(
            left in any::<bool>(),
            xs in prop::array::uniform3(1000i32..i32::MAX),
            ys in prop::array::uniform3(any::<i32>()),
            len in -500i32..500,
            r in 0i32..500,
            delta in 0i32..500,
        ) {
            let [x0, x1, x2] = xs.map(|x| if left { -x } else { x });
            let [y0, y1, y2] = ys;
            let mut canvas = blank(64, 32);
            canvas.set_pixel(x0, y0, Color::Black);
            canvas.draw_fast_hline(x0, y0, len, Color::Black);
            canvas.draw_fast_vline(x0, y0, len, Color::Black);
            canvas.draw_line(x0, y0, x1, y1, Color::Black);
            canvas.draw_rect(x0, y0, len, len, Color::Black);
            canvas.fill_rect(x0, y0, len, len, Color::Black);
            canvas.draw_circle(x0, y0, r, Color::Black);
            canvas.fill_circle(x0, y0, r, Color::Black);
            canvas.draw_circle_helper(x0, y0, r, QUADRANT_ALL, Color::Black);
            canvas.fill_circle_helper(x0, y0, r, HALF_LOWER | HALF_UPPER, delta, Color::Black);
            canvas.draw_triangle(x0, y0, x1, y1, x2, y2, Color::Black);
            canvas.fill_triangle(x0, y0, x1, y1, x2, y2, Color::Black);
            canvas.draw_round_rect(x0, y0, len, len, r, Color::Black);
            canvas.fill_round_rect(x0, y0, len, len, r, Color::Black);
            canvas.draw_bitmap(x0, y0, &[0xFF; 4], 16, 2, Color::Black, Some(Color::Black));
            canvas.draw_xbitmap(x0, y0, &[0xFF; 4], 16, 2, Color::Black);
            canvas.set_text_wrap(false);
            canvas.set_text_size(3);
            canvas.set_text_color_bg(Color::Black, Color::Black);
            canvas.write_at(x0, y0, "Wg\nWg");
            prop_assert!(canvas.buffer().iter().all(|b| *b == 0xFF));
        }

        #[test]
        fn prop_small_canvas_is_crop_of_large(
            shape in 0u8..15,
            p in prop::array::uniform6(prop_oneof![any::<i32>(), -40i32..80]),
            r in prop_oneof![any::<i32>(), -5i32..60],
        ) {
            let mut small = blank(24, 12);
            let mut large = blank(64, 32);
            draw_shape(&mut small, shape, p, r);
            draw_shape(&mut large, shape, p, r);
            for y in 0..12 {
                for x in 0..24 {
                    prop_assert_eq!(small.pixel(x, y), large.pixel(x, y), "at ({}, {})", x, y);
                }
            }
        }

        #[test]
        fn prop_line_sets_both_endpoints(
            x0 in -20i32..84, y0 in -20i32..52, x1 in -20i32..84, y1 in -20i32..52,
        ) {
            let mut canvas = blank(64, 32);
            canvas.draw_line(x0, y0, x1, y1, Color::Black);
            for (x, y) in [(x0, y0), (x1, y1)] {
                if let Some(color) = canvas.pixel(x, y) {
                    prop_assert_eq!(color, Color::Black);
                }
            }
        }
    }
}
