//! Bitmap fonts
//!
//! Two kinds of fonts are supported:
//!
//! - [`GlyphFont`]: proportional fonts in the widespread GFX layout. Each [`Glyph`]
//!   points into a shared bitmap blob packed MSB-first without row padding, and
//!   carries its own advance and offsets from the baseline.
//! - The built-in fixed font, used when no font is bound: 5×7 pixel cells stored
//!   column by column (least significant bit at the top), advanced by 6 pixels per
//!   character and 8 pixels per line. It covers printable ASCII plus the code page
//!   437 glyphs for ä ö ü Ä Ö Ü ß and °.

/// Width of a built-in glyph cell in pixels
pub const BUILTIN_GLYPH_WIDTH: u8 = 5;
/// Height of a built-in glyph cell in pixels
pub const BUILTIN_GLYPH_HEIGHT: u8 = 7;
/// Horizontal advance of the built-in font at size 1
pub const BUILTIN_X_ADVANCE: u8 = 6;
/// Line advance of the built-in font at size 1
pub const BUILTIN_Y_ADVANCE: u8 = 8;

/// Metrics and bitmap location of one character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    /// Offset of the first bitmap byte in [`GlyphFont::bitmap`]
    pub bitmap_offset: u16,
    /// Bitmap width in pixels
    pub width: u8,
    /// Bitmap height in pixels
    pub height: u8,
    /// Cursor advance after drawing
    pub x_advance: u8,
    /// Horizontal distance from the cursor to the bitmap's left edge
    pub x_offset: i8,
    /// Vertical distance from the baseline to the bitmap's top edge
    pub y_offset: i8,
}

/// Proportional bitmap font covering the code points `first..=last`
#[derive(Clone, Copy, Debug)]
pub struct GlyphFont<'a> {
    /// Concatenated glyph bitmaps
    pub bitmap: &'a [u8],
    /// One entry per code point from `first` to `last`
    pub glyphs: &'a [Glyph],
    /// First covered code point
    pub first: u16,
    /// Last covered code point
    pub last: u16,
    /// Line advance in pixels
    pub y_advance: u8,
}

impl<'a> GlyphFont<'a> {
    /// Glyph for `code`, `None` if outside the font's range
    pub fn glyph(&self, code: u32) -> Option<&'a Glyph> {
        if code < u32::from(self.first) || code > u32::from(self.last) {
            return None;
        }
        self.glyphs.get((code - u32::from(self.first)) as usize)
    }

    /// Bitmap bytes of `glyph`, `None` if they extend past the blob
    pub fn glyph_bitmap(&self, glyph: &Glyph) -> Option<&'a [u8]> {
        let start = usize::from(glyph.bitmap_offset);
        let len = (usize::from(glyph.width) * usize::from(glyph.height)).div_ceil(8);
        self.bitmap.get(start..start + len)
    }
}

/// Column data of the built-in glyph for `code`
///
/// Each byte is one column, bit 0 being the top row. Codes without a glyph return
/// `None`; they still occupy a blank cell when written.
pub fn builtin_glyph(code: u32) -> Option<&'static [u8; 5]> {
    if (0x20..=0x7F).contains(&code) {
        return BUILTIN_ASCII.get((code - 0x20) as usize);
    }
    BUILTIN_EXTRA
        .iter()
        .find(|(c, _)| u32::from(*c) == code)
        .map(|(_, columns)| columns)
}

/// Map a Latin-1 code point to its code page 437 equivalent
///
/// Code points below 0x80 and above 0xFF pass through unchanged. Latin-1
/// characters without a code page 437 counterpart become `?`.
pub fn remap_legacy(code: u32) -> u32 {
    match code {
        0x80..=0xFF => u32::from(LEGACY_CHARSET[(code - 0x80) as usize]),
        _ => code,
    }
}

/// Latin-1 (0x80..=0xFF) to code page 437
pub const LEGACY_CHARSET: [u8; 128] = [
    0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, // 0x80
    0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, // 0x88
    0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, // 0x90
    0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, // 0x98
    0xFF, 0xAD, 0x9B, 0x9C, 0x3F, 0x9D, 0x3F, 0x3F, // 0xA0
    0x3F, 0x3F, 0xA6, 0xAE, 0xAA, 0x3F, 0x3F, 0x3F, // 0xA8
    0xF8, 0xF1, 0xFD, 0x3F, 0x3F, 0xE6, 0x3F, 0xFA, // 0xB0
    0x3F, 0x3F, 0xA7, 0xAF, 0xAC, 0xAB, 0x3F, 0xA8, // 0xB8
    0x3F, 0x3F, 0x3F, 0x3F, 0x8E, 0x8F, 0x92, 0x80, // 0xC0
    0x3F, 0x90, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, // 0xC8
    0x3F, 0xA5, 0x3F, 0x3F, 0x3F, 0x3F, 0x99, 0x3F, // 0xD0
    0x3F, 0x3F, 0x3F, 0x3F, 0x9A, 0x3F, 0x3F, 0xE1, // 0xD8
    0x85, 0xA0, 0x83, 0x3F, 0x84, 0x86, 0x91, 0x87, // 0xE0
    0x8A, 0x82, 0x88, 0x89, 0x8D, 0xA1, 0x8C, 0x8B, // 0xE8
    0x3F, 0xA4, 0x95, 0xA2, 0x93, 0x3F, 0x94, 0xF6, // 0xF0
    0x3F, 0x97, 0xA3, 0x96, 0x81, 0x3F, 0x3F, 0x98, // 0xF8
];

const BUILTIN_ASCII: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // 0x20 space
    [0x00, 0x00, 0x5F, 0x00, 0x00], // 0x21 !
    [0x00, 0x07, 0x00, 0x07, 0x00], // 0x22 "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // 0x23 #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // 0x24 $
    [0x23, 0x13, 0x08, 0x64, 0x62], // 0x25 %
    [0x36, 0x49, 0x55, 0x22, 0x50], // 0x26 &
    [0x00, 0x05, 0x03, 0x00, 0x00], // 0x27 '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // 0x28 (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // 0x29 )
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // 0x2A *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // 0x2B +
    [0x00, 0x50, 0x30, 0x00, 0x00], // 0x2C ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // 0x2D -
    [0x00, 0x60, 0x60, 0x00, 0x00], // 0x2E .
    [0x20, 0x10, 0x08, 0x04, 0x02], // 0x2F /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0x30 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 0x31 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 0x32 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 0x33 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 0x34 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 0x35 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 0x36 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 0x37 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 0x38 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 0x39 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // 0x3A :
    [0x00, 0x56, 0x36, 0x00, 0x00], // 0x3B ;
    [0x00, 0x08, 0x14, 0x22, 0x41], // 0x3C <
    [0x14, 0x14, 0x14, 0x14, 0x14], // 0x3D =
    [0x41, 0x22, 0x14, 0x08, 0x00], // 0x3E >
    [0x02, 0x01, 0x51, 0x09, 0x06], // 0x3F ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // 0x40 @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 0x41 A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 0x42 B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 0x43 C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 0x44 D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 0x45 E
    [0x7F, 0x09, 0x09, 0x01, 0x01], // 0x46 F
    [0x3E, 0x41, 0x41, 0x51, 0x32], // 0x47 G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 0x48 H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 0x49 I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 0x4A J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 0x4B K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 0x4C L
    [0x7F, 0x02, 0x04, 0x02, 0x7F], // 0x4D M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 0x4E N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 0x4F O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 0x50 P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 0x51 Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 0x52 R
    [0x46, 0x49, 0x49, 0x49, 0x31], // 0x53 S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 0x54 T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 0x55 U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 0x56 V
    [0x7F, 0x20, 0x18, 0x20, 0x7F], // 0x57 W
    [0x63, 0x14, 0x08, 0x14, 0x63], // 0x58 X
    [0x03, 0x04, 0x78, 0x04, 0x03], // 0x59 Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // 0x5A Z
    [0x00, 0x00, 0x7F, 0x41, 0x41], // 0x5B [
    [0x02, 0x04, 0x08, 0x10, 0x20], // 0x5C backslash
    [0x41, 0x41, 0x7F, 0x00, 0x00], // 0x5D ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // 0x5E ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // 0x5F _
    [0x00, 0x01, 0x02, 0x04, 0x00], // 0x60 `
    [0x20, 0x54, 0x54, 0x54, 0x78], // 0x61 a
    [0x7F, 0x48, 0x44, 0x44, 0x38], // 0x62 b
    [0x38, 0x44, 0x44, 0x44, 0x20], // 0x63 c
    [0x38, 0x44, 0x44, 0x48, 0x7F], // 0x64 d
    [0x38, 0x54, 0x54, 0x54, 0x18], // 0x65 e
    [0x08, 0x7E, 0x09, 0x01, 0x02], // 0x66 f
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // 0x67 g
    [0x7F, 0x08, 0x04, 0x04, 0x78], // 0x68 h
    [0x00, 0x44, 0x7D, 0x40, 0x00], // 0x69 i
    [0x20, 0x40, 0x44, 0x3D, 0x00], // 0x6A j
    [0x7F, 0x10, 0x28, 0x44, 0x00], // 0x6B k
    [0x00, 0x41, 0x7F, 0x40, 0x00], // 0x6C l
    [0x7C, 0x04, 0x18, 0x04, 0x78], // 0x6D m
    [0x7C, 0x08, 0x04, 0x04, 0x78], // 0x6E n
    [0x38, 0x44, 0x44, 0x44, 0x38], // 0x6F o
    [0x7C, 0x14, 0x14, 0x14, 0x08], // 0x70 p
    [0x08, 0x14, 0x14, 0x18, 0x7C], // 0x71 q
    [0x7C, 0x08, 0x04, 0x04, 0x08], // 0x72 r
    [0x48, 0x54, 0x54, 0x54, 0x20], // 0x73 s
    [0x04, 0x3F, 0x44, 0x40, 0x20], // 0x74 t
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // 0x75 u
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // 0x76 v
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // 0x77 w
    [0x44, 0x28, 0x10, 0x28, 0x44], // 0x78 x
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // 0x79 y
    [0x44, 0x64, 0x54, 0x4C, 0x44], // 0x7A z
    [0x00, 0x08, 0x36, 0x41, 0x00], // 0x7B {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // 0x7C |
    [0x00, 0x41, 0x36, 0x08, 0x00], // 0x7D }
    [0x10, 0x08, 0x08, 0x10, 0x08], // 0x7E ~
    [0x78, 0x46, 0x41, 0x46, 0x78], // 0x7F DEL
];

/// Code page 437 glyphs outside ASCII
const BUILTIN_EXTRA: [(u8, [u8; 5]); 8] = [
    (0x81, [0x3C, 0x41, 0x40, 0x21, 0x7C]), // ü
    (0x84, [0x20, 0x55, 0x54, 0x55, 0x78]), // ä
    (0x8E, [0x7D, 0x12, 0x11, 0x12, 0x7D]), // Ä
    (0x94, [0x38, 0x45, 0x44, 0x45, 0x38]), // ö
    (0x99, [0x3D, 0x42, 0x42, 0x42, 0x3D]), // Ö
    (0x9A, [0x3D, 0x40, 0x40, 0x40, 0x3D]), // Ü
    (0xE1, [0x7E, 0x01, 0x49, 0x4E, 0x30]), // ß
    (0xF8, [0x00, 0x06, 0x09, 0x09, 0x06]), // °
];
