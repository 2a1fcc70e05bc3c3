//! Drawing primitives on top of [`Framebuffer::set_pixel`]
//!
//! Everything takes logical landscape coordinates and clips at the canvas edge.
//! Nothing here can fail: degenerate sizes draw nothing, unknown glyphs draw blank.

use crate::epd2in66g::color::QuadColor;
use crate::graphics::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::graphics::framebuffer::Framebuffer;

/// Filled axis-aligned rectangle
pub fn rect(fb: &mut Framebuffer, x: i32, y: i32, w: i32, h: i32, color: QuadColor) {
    fill_clipped(fb, x.into(), y.into(), w.into(), h.into(), color);
}

/// Fill only the part of a rectangle that lies on the canvas.
///
/// Geometry is widened to `i64` so callers can offset and scale any `i32` input
/// without overflowing.
fn fill_clipped(fb: &mut Framebuffer, x: i64, y: i64, w: i64, h: i64, color: QuadColor) {
    let (canvas_w, canvas_h) = canvas(fb);
    let x_end = x.saturating_add(w).min(canvas_w);
    let y_end = y.saturating_add(h).min(canvas_h);
    for yy in y.max(0)..y_end {
        for xx in x.max(0)..x_end {
            // inside 0..canvas, fits i32
            fb.set_pixel(xx as i32, yy as i32, color);
        }
    }
}

fn canvas(fb: &Framebuffer) -> (i64, i64) {
    let (w, h) = fb.logical_size();
    (w as i64, h as i64)
}

pub fn hline(fb: &mut Framebuffer, x: i32, y: i32, w: i32, color: QuadColor) {
    rect(fb, x, y, w, 1, color);
}

pub fn vline(fb: &mut Framebuffer, x: i32, y: i32, h: i32, color: QuadColor) {
    rect(fb, x, y, 1, h, color);
}

/// One pixel frame around the whole canvas
pub fn border(fb: &mut Framebuffer, color: QuadColor) {
    let (w, h) = fb.logical_size();
    let (w, h) = (w as i32, h as i32);
    hline(fb, 0, 0, w, color);
    hline(fb, 0, h - 1, w, color);
    vline(fb, 0, 0, h, color);
    vline(fb, w - 1, 0, h, color);
}

/// One 5x7 glyph, each font pixel becomes a `scale` x `scale` block
pub fn draw_char(fb: &mut Framebuffer, x: i32, y: i32, ch: char, scale: i32, color: QuadColor) {
    glyph_at(fb, x.into(), y.into(), ch, scale.into(), color);
}

fn glyph_at(fb: &mut Framebuffer, x: i64, y: i64, ch: char, scale: i64, color: QuadColor) {
    let glyph = font::glyph(ch);
    for row in 0..GLYPH_HEIGHT {
        for col in 0..GLYPH_WIDTH {
            if font::is_set(glyph, col, row) {
                let (col, row) = (i64::from(col), i64::from(row));
                fill_clipped(fb, x + col * scale, y + row * scale, scale, scale, color);
            }
        }
    }
}

/// Left to right, advancing `5 * scale + spacing` per character
pub fn draw_text(
    fb: &mut Framebuffer,
    x: i32,
    y: i32,
    text: &str,
    scale: i32,
    spacing: i32,
    color: QuadColor,
) {
    let (canvas_w, _) = canvas(fb);
    let scale = i64::from(scale);
    let advance = i64::from(GLYPH_WIDTH) * scale + i64::from(spacing);
    let mut cx = i64::from(x);
    for ch in text.chars() {
        if advance >= 0 && cx >= canvas_w {
            break;
        }
        glyph_at(fb, cx, y.into(), ch, scale, color);
        cx = cx.saturating_add(advance);
    }
}

/// Horizontal extent of [`draw_text`], without the trailing spacing.
///
/// Saturates at the `i32` limits.
pub fn text_width(text: &str, scale: i32, spacing: i32) -> i32 {
    let n = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
    if n == 0 {
        return 0;
    }
    let advance = i64::from(GLYPH_WIDTH) * i64::from(scale) + i64::from(spacing);
    let width = n.saturating_mul(advance).saturating_sub(i64::from(spacing));
    width.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Segment bits: top, upper right, lower right, bottom, lower left, upper left, middle
const SEG_TOP: u8 = 1 << 0;
const SEG_UPPER_RIGHT: u8 = 1 << 1;
const SEG_LOWER_RIGHT: u8 = 1 << 2;
const SEG_BOTTOM: u8 = 1 << 3;
const SEG_LOWER_LEFT: u8 = 1 << 4;
const SEG_UPPER_LEFT: u8 = 1 << 5;
const SEG_MIDDLE: u8 = 1 << 6;

const DIGIT_SEGMENTS: [u8; 10] = [
    SEG_TOP | SEG_UPPER_RIGHT | SEG_LOWER_RIGHT | SEG_BOTTOM | SEG_LOWER_LEFT | SEG_UPPER_LEFT,
    SEG_UPPER_RIGHT | SEG_LOWER_RIGHT,
    SEG_TOP | SEG_UPPER_RIGHT | SEG_MIDDLE | SEG_LOWER_LEFT | SEG_BOTTOM,
    SEG_TOP | SEG_UPPER_RIGHT | SEG_MIDDLE | SEG_LOWER_RIGHT | SEG_BOTTOM,
    SEG_UPPER_LEFT | SEG_MIDDLE | SEG_UPPER_RIGHT | SEG_LOWER_RIGHT,
    SEG_TOP | SEG_UPPER_LEFT | SEG_MIDDLE | SEG_LOWER_RIGHT | SEG_BOTTOM,
    SEG_TOP | SEG_UPPER_LEFT | SEG_MIDDLE | SEG_LOWER_RIGHT | SEG_BOTTOM | SEG_LOWER_LEFT,
    SEG_TOP | SEG_UPPER_RIGHT | SEG_LOWER_RIGHT,
    0x7F,
    SEG_TOP | SEG_UPPER_RIGHT | SEG_LOWER_RIGHT | SEG_BOTTOM | SEG_UPPER_LEFT | SEG_MIDDLE,
];

/// Segment mask for a decimal digit, `0` (nothing lit) for anything else
pub fn digit_segments(digit: i32) -> u8 {
    usize::try_from(digit)
        .ok()
        .and_then(|d| DIGIT_SEGMENTS.get(d))
        .copied()
        .unwrap_or(0)
}

/// Seven segment digit in a `6s` x `10s` cell, `s` is the stroke thickness
pub fn draw_digit_7seg(fb: &mut Framebuffer, x: i32, y: i32, s: i32, digit: i32, color: QuadColor) {
    let segments = digit_segments(digit);
    let (x, y, t) = (i64::from(x), i64::from(y), i64::from(s));
    let w = 6 * t;
    let h = 10 * t;
    let half = h / 2;

    let geometry = [
        (SEG_TOP, x + t, y, w - 2 * t, t),
        (SEG_UPPER_RIGHT, x + w - t, y + t, t, half - t),
        (SEG_LOWER_RIGHT, x + w - t, y + half, t, half - t),
        (SEG_BOTTOM, x + t, y + h - t, w - 2 * t, t),
        (SEG_LOWER_LEFT, x, y + half, t, half - t),
        (SEG_UPPER_LEFT, x, y + t, t, half - t),
        (SEG_MIDDLE, x + t, y + half - t / 2, w - 2 * t, t),
    ];

    for (bit, sx, sy, sw, sh) in geometry {
        if segments & bit != 0 {
            fill_clipped(fb, sx, sy, sw, sh, color);
        }
    }
}

/// Width of the degree Celsius icon
pub const DEG_C_ICON_WIDTH: i32 = 24;

/// Height of the degree Celsius icon
pub const DEG_C_ICON_HEIGHT: i32 = 18;

/// Hollow degree ring followed by a blocky "C"
pub fn draw_deg_c_icon(fb: &mut Framebuffer, x: i32, y: i32, fg: QuadColor, bg: QuadColor) {
    let (x, y) = (i64::from(x), i64::from(y));

    // degree ring
    fill_clipped(fb, x, y, 6, 6, fg);
    fill_clipped(fb, x + 2, y + 2, 2, 2, bg);

    let cx = x + 10;
    let cy = y + 2;
    fill_clipped(fb, cx, cy, 14, 3, fg);
    fill_clipped(fb, cx, cy, 3, 16, fg);
    fill_clipped(fb, cx, cy + 13, 14, 3, fg);
}

/// Triangle rows `0..size` that land on the canvas when row `k` is drawn at `top + k`
fn visible_rows(fb: &Framebuffer, top: i64, size: i64) -> core::ops::Range<i64> {
    let (_, canvas_h) = canvas(fb);
    (-top).max(0)..size.min(canvas_h - top)
}

/// Filled triangle with the apex at (`x`, `y`) and a stem below
pub fn draw_arrow_up(fb: &mut Framebuffer, x: i32, y: i32, size: i32, color: QuadColor) {
    let (x, y, size) = (i64::from(x), i64::from(y), i64::from(size));
    for r in visible_rows(fb, y, size) {
        fill_clipped(fb, x - r, y + r, 1 + 2 * r, 1, color);
    }
    fill_clipped(fb, x - 1, y + size, 3, size + 2, color);
}

/// Filled triangle with the apex at (`x`, `y + size - 1`) and a stem above
pub fn draw_arrow_down(fb: &mut Framebuffer, x: i32, y: i32, size: i32, color: QuadColor) {
    let (x, y, size) = (i64::from(x), i64::from(y), i64::from(size));
    for k in visible_rows(fb, y, size) {
        let r = size - 1 - k;
        fill_clipped(fb, x - r, y + k, 1 + 2 * r, 1, color);
    }
    fill_clipped(fb, x - 1, y - (size + 2), 3, size + 2, color);
}

/// Battery outline with a nub on the right, filled proportionally to `percent`.
///
/// Any non-zero charge shows at least a one pixel sliver.
#[allow(clippy::too_many_arguments)]
pub fn draw_battery(
    fb: &mut Framebuffer,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    percent: u8,
    fg: QuadColor,
    bg: QuadColor,
) {
    let percent = i64::from(percent.min(100));
    let (x, y, w, h) = (i64::from(x), i64::from(y), i64::from(w), i64::from(h));

    fill_clipped(fb, x, y, w, h, fg);
    fill_clipped(fb, x + 1, y + 1, w - 2, h - 2, bg);

    let nub_w = (w / 10).max(2);
    let nub_h = (h / 2).max(4);
    fill_clipped(fb, x + w, y + (h - nub_h) / 2, nub_w, nub_h, fg);

    let inner_w = w - 2;
    let inner_h = h - 2;
    let fill_w = inner_w * percent / 100;
    fill_clipped(fb, x + 1, y + 1, fill_w, inner_h, fg);
    if percent > 0 && fill_w == 0 {
        fill_clipped(fb, x + 1, y + 1, 1, inner_h, fg);
    }
}
