//! Fixed 5x7 block font
//!
//! Each glyph is seven rows, the low five bits of each row are the pixels with
//! bit 4 as the leftmost column. Characters missing from the table draw blank.

/// Glyph width in font pixels
pub const GLYPH_WIDTH: i32 = 5;

/// Glyph height in font pixels
pub const GLYPH_HEIGHT: i32 = 7;

/// Row bitmaps of one glyph
pub type Glyph = [u8; GLYPH_HEIGHT as usize];

const BLANK: Glyph = [0; GLYPH_HEIGHT as usize];

#[rustfmt::skip]
const GLYPHS: &[(char, Glyph)] = &[
    ('A', [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('B', [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
    ('C', [0b01111, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b01111]),
    ('E', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
    ('I', [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111]),
    ('L', [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
    ('M', [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
    ('O', [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('P', [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('R', [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
    ('T', [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
    (' ', BLANK),
];

/// Bitmap for `ch`, blank when the font has no such glyph
pub fn glyph(ch: char) -> &'static Glyph {
    GLYPHS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, rows)| rows)
        .unwrap_or(&BLANK)
}

/// Whether font pixel (`col`, `row`) of a glyph is set
pub fn is_set(glyph: &Glyph, col: i32, row: i32) -> bool {
    (0..GLYPH_WIDTH).contains(&col)
        && (0..GLYPH_HEIGHT).contains(&row)
        && glyph[row as usize] & (1 << (GLYPH_WIDTH - 1 - col)) != 0
}
