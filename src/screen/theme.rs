use crate::epd2in66g::color::QuadColor;

/// Above this the header turns yellow
pub const WARM_ABOVE: i32 = 36;

/// Above this the header turns red
pub const HOT_ABOVE: i32 = 41;

/// Header colors picked from the temperature
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub header_bg: QuadColor,
    pub header_fg: QuadColor,
}

impl Theme {
    /// Red above 41, yellow from 37 to 41, black otherwise
    pub fn for_temperature(temp_c: i32) -> Self {
        let (header_bg, header_fg) = if temp_c > HOT_ABOVE {
            (QuadColor::Red, QuadColor::White)
        } else if temp_c > WARM_ABOVE {
            (QuadColor::Yellow, QuadColor::Black)
        } else {
            (QuadColor::Black, QuadColor::White)
        };
        Theme {
            header_bg,
            header_fg,
        }
    }

    /// Replace the header background, text turns black on a white header
    pub fn with_header(self, header_bg: QuadColor) -> Self {
        let header_fg = if header_bg == QuadColor::White {
            QuadColor::Black
        } else {
            self.header_fg
        };
        Theme {
            header_bg,
            header_fg,
        }
    }
}
