//! Frame composer for the 360x184 landscape canvas
//!
//! ```text
//! +--------------------------------------------------+
//! |                   BOILER                  [###]> |  header, themed
//! +--------------------------------------------------+
//! |                    TEMP                          |
//! |             +--+   +--+   o +--                  |
//! |             |  |   |  |     |                    |
//! |             +--+   +--+     +--                  |
//! |                               ^                  |  trend arrow
//! +--------------------------------------------------+
//! ```

use crate::epd2in66g::color::QuadColor;
use crate::graphics::framebuffer::{Framebuffer, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::graphics::font::GLYPH_HEIGHT;
use crate::graphics::primitives::{
    border, draw_arrow_down, draw_arrow_up, draw_battery, draw_deg_c_icon, draw_digit_7seg,
    draw_text, rect, text_width,
};
use crate::screen::{Arrow, Theme};

const TITLE: &str = "BOILER";
const TITLE_SCALE: i32 = 3;
const TITLE_SPACING: i32 = 3;

const LABEL: &str = "TEMP";
const LABEL_SCALE: i32 = 2;
const LABEL_SPACING: i32 = 2;

const HEADER_HEIGHT: i32 = 28;

const DIGIT_STROKE: i32 = 9;
const DIGIT_GAP: i32 = 22;
const ICON_SLOT_WIDTH: i32 = 28;
const ICON_GAP: i32 = 12;
const ICON_SLOT_HEIGHT: i32 = 20;

const ARROW_SIZE: i32 = 6;

const BATTERY_WIDTH: i32 = 32;
const BATTERY_HEIGHT: i32 = 12;

/// Readings outside this range are clamped for drawing
pub const DISPLAY_RANGE: core::ops::RangeInclusive<i32> = 0..=99;

/// Positions of every element, fixed for the canvas size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    pub title: (i32, i32),
    pub label: (i32, i32),
    pub tens: (i32, i32),
    pub ones: (i32, i32),
    pub icon: (i32, i32),
    pub arrow: (i32, i32),
    pub battery: (i32, i32),
}

impl FrameLayout {
    pub fn compute() -> Self {
        let header_top = 1;
        let header_bottom = 1 + HEADER_HEIGHT;

        let title_w = text_width(TITLE, TITLE_SCALE, TITLE_SPACING);
        let title_h = GLYPH_HEIGHT * TITLE_SCALE;
        let title_x = (LOGICAL_WIDTH - title_w) / 2;
        let title_y = (header_top + (header_bottom - header_top - title_h) / 2).max(header_top + 2);

        let digit_w = 6 * DIGIT_STROKE;
        let digit_h = 10 * DIGIT_STROKE;
        let digits_w = 2 * digit_w + DIGIT_GAP;
        let group_w = digits_w + ICON_GAP + ICON_SLOT_WIDTH;
        let start_x = (LOGICAL_WIDTH - group_w) / 2;

        let body_top = header_bottom + 1 + 10;
        let body_h = (LOGICAL_HEIGHT - 1) - body_top;
        let digits_y = body_top + (body_h - digit_h) / 2 + 6;

        let label_w = text_width(LABEL, LABEL_SCALE, LABEL_SPACING);
        let label_x = (LOGICAL_WIDTH - label_w) / 2;
        let label_y = (digits_y - GLYPH_HEIGHT * LABEL_SCALE - 10).max(header_bottom + 1 + 4);

        let icon_x = (start_x + digits_w + ICON_GAP).min(LOGICAL_WIDTH - 1 - ICON_SLOT_WIDTH);
        let icon_y = (digits_y + 10).min(LOGICAL_HEIGHT - 1 - ICON_SLOT_HEIGHT);

        let arrow_x = icon_x + ICON_SLOT_WIDTH / 2;
        let arrow_y = (icon_y + 28).min(LOGICAL_HEIGHT - 2 - (ARROW_SIZE + 12));

        let battery_x = LOGICAL_WIDTH - 1 - 6 - BATTERY_WIDTH - 4;
        let battery_y = header_top + 7;

        FrameLayout {
            title: (title_x, title_y),
            label: (label_x, label_y),
            tens: (start_x, digits_y),
            ones: (start_x + digit_w + DIGIT_GAP, digits_y),
            icon: (icon_x, icon_y),
            arrow: (arrow_x, arrow_y),
            battery: (battery_x, battery_y),
        }
    }
}

/// Draw the complete screen for `temp_c` into `fb`.
///
/// `header_override` replaces the themed header background, used for the
/// white flash before the final colors. `battery` is a percentage, `None`
/// hides the gauge.
pub fn compose_frame(
    fb: &mut Framebuffer,
    temp_c: i32,
    battery: Option<u8>,
    arrow: Arrow,
    header_override: Option<QuadColor>,
) {
    let shown = temp_c.clamp(*DISPLAY_RANGE.start(), *DISPLAY_RANGE.end());

    let theme = Theme::for_temperature(temp_c);
    let theme = match header_override {
        Some(bg) => theme.with_header(bg),
        None => theme,
    };
    let layout = FrameLayout::compute();

    fb.fill(QuadColor::White);
    border(fb, theme.header_fg);

    rect(fb, 1, 1, LOGICAL_WIDTH - 2, HEADER_HEIGHT, theme.header_bg);
    rect(fb, 1, 1 + HEADER_HEIGHT, LOGICAL_WIDTH - 2, 1, theme.header_fg);

    let (x, y) = layout.title;
    draw_text(fb, x, y, TITLE, TITLE_SCALE, TITLE_SPACING, theme.header_fg);

    let (x, y) = layout.label;
    draw_text(fb, x, y, LABEL, LABEL_SCALE, LABEL_SPACING, theme.header_fg);

    let (x, y) = layout.tens;
    draw_digit_7seg(fb, x, y, DIGIT_STROKE, shown / 10, QuadColor::Black);
    let (x, y) = layout.ones;
    draw_digit_7seg(fb, x, y, DIGIT_STROKE, shown % 10, QuadColor::Black);

    let (x, y) = layout.icon;
    draw_deg_c_icon(fb, x, y, QuadColor::Black, QuadColor::White);

    let (x, y) = layout.arrow;
    match arrow {
        Arrow::Up => draw_arrow_up(fb, x, y, ARROW_SIZE, QuadColor::Black),
        Arrow::Down => draw_arrow_down(fb, x, y, ARROW_SIZE, QuadColor::Red),
        Arrow::None => {}
    }

    if let Some(percent) = battery {
        let (x, y) = layout.battery;
        draw_battery(
            fb,
            x,
            y,
            BATTERY_WIDTH,
            BATTERY_HEIGHT,
            percent,
            theme.header_fg,
            theme.header_bg,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(temp_c: i32, battery: Option<u8>, arrow: Arrow, header: Option<QuadColor>) -> Framebuffer {
        let mut fb = Framebuffer::new();
        compose_frame(&mut fb, temp_c, battery, arrow, header);
        fb
    }

    /// Pixel inside the top bar of a seven segment digit at `origin`
    fn top_bar(origin: (i32, i32)) -> (i32, i32) {
        (origin.0 + DIGIT_STROKE, origin.1)
    }

    /// Pixel inside the middle bar of a seven segment digit at `origin`
    fn middle_bar(origin: (i32, i32)) -> (i32, i32) {
        (origin.0 + DIGIT_STROKE, origin.1 + 5 * DIGIT_STROKE - DIGIT_STROKE / 2)
    }

    #[test]
    fn layout_is_centred_on_the_canvas() {
        let layout = FrameLayout::compute();
        assert_eq!(layout.title, (127, 4));
        assert_eq!(layout.label, (157, 48));
        assert_eq!(layout.tens, (95, 72));
        assert_eq!(layout.ones, (171, 72));
        assert_eq!(layout.icon, (237, 82));
        assert_eq!(layout.arrow, (251, 110));
        assert_eq!(layout.battery, (317, 8));
    }

    #[test]
    fn warm_reading_gets_yellow_header() {
        let fb = frame(38, None, Arrow::None, None);
        assert_eq!(fb.pixel(5, 5), Some(QuadColor::Yellow));
        // border and separator use the header text color
        assert_eq!(fb.pixel(0, 0), Some(QuadColor::Black));
        assert_eq!(fb.pixel(5, 29), Some(QuadColor::Black));
        assert_eq!(fb.pixel(5, 100), Some(QuadColor::White));
    }

    #[test]
    fn title_is_drawn_in_header_text_color() {
        let fb = frame(50, None, Arrow::None, None);
        let (x, y) = FrameLayout::compute().title;
        assert_eq!(fb.pixel(x, y), Some(QuadColor::White));
        assert_eq!(fb.pixel(x - 2, y), Some(QuadColor::Red));
    }

    #[test]
    fn white_override_draws_black_text_on_white() {
        let fb = frame(50, None, Arrow::None, Some(QuadColor::White));
        let (x, y) = FrameLayout::compute().title;
        assert_eq!(fb.pixel(5, 5), Some(QuadColor::White));
        assert_eq!(fb.pixel(x, y), Some(QuadColor::Black));
        assert_eq!(fb.pixel(0, 0), Some(QuadColor::Black));
    }

    #[test]
    fn digits_show_tens_and_ones() {
        let layout = FrameLayout::compute();
        let fb = frame(70, None, Arrow::None, None);
        // 7 has a top bar but no middle bar
        let (x, y) = top_bar(layout.tens);
        assert_eq!(fb.pixel(x, y), Some(QuadColor::Black));
        let (x, y) = middle_bar(layout.tens);
        assert_eq!(fb.pixel(x, y), Some(QuadColor::White));

        let fb = frame(48, None, Arrow::None, None);
        let (x, y) = top_bar(layout.tens);
        assert_eq!(fb.pixel(x, y), Some(QuadColor::White));
        let (x, y) = middle_bar(layout.ones);
        assert_eq!(fb.pixel(x, y), Some(QuadColor::Black));
    }

    #[test]
    fn out_of_range_readings_are_clamped() {
        let layout = FrameLayout::compute();

        let fb = frame(-12, None, Arrow::None, None);
        let (x, y) = middle_bar(layout.tens);
        assert_eq!(fb.pixel(x, y), Some(QuadColor::White));
        let (x, y) = top_bar(layout.ones);
        assert_eq!(fb.pixel(x, y), Some(QuadColor::Black));

        let hot = frame(150, None, Arrow::None, None);
        let ninety_nine = frame(99, None, Arrow::None, None);
        assert_eq!(hot.buffer(), ninety_nine.buffer());
    }

    #[test]
    fn up_arrow_is_black_down_arrow_is_red() {
        let (x, y) = FrameLayout::compute().arrow;

        let up = frame(30, None, Arrow::Up, None);
        assert_eq!(up.pixel(x, y), Some(QuadColor::Black));

        // red regardless of theme
        let down = frame(30, None, Arrow::Down, None);
        assert_eq!(down.pixel(x, y + ARROW_SIZE - 1), Some(QuadColor::Red));

        let none = frame(30, None, Arrow::None, None);
        assert_eq!(none.pixel(x, y), Some(QuadColor::White));
        assert_eq!(none.pixel(x, y + ARROW_SIZE - 1), Some(QuadColor::White));
    }

    #[test]
    fn battery_gauge_only_when_known() {
        let (x, y) = FrameLayout::compute().battery;

        let full = frame(20, Some(100), Arrow::None, None);
        assert_eq!(full.pixel(x + 5, y + 5), Some(QuadColor::White));

        let hidden = frame(20, None, Arrow::None, None);
        assert_eq!(hidden.pixel(x + 5, y + 5), Some(QuadColor::Black));
        assert_eq!(hidden.pixel(x, y), Some(QuadColor::Black));
    }
}
