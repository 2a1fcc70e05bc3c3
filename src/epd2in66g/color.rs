//! Four-color pixel codes of the 2.66" (G) panel

use embedded_graphics::pixelcolor::raw::RawU2;
use embedded_graphics::pixelcolor::PixelColor;

/// Ink color of a single pixel, stored as a 2-bit code in the frame buffer.
///
/// The code to ink mapping is defined by the panel, not by this driver.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QuadColor {
    Black = 0b00,
    #[default]
    White = 0b01,
    Yellow = 0b10,
    Red = 0b11,
}

impl QuadColor {
    /// Every code, in code order
    pub const ALL: [QuadColor; 4] = [
        QuadColor::Black,
        QuadColor::White,
        QuadColor::Yellow,
        QuadColor::Red,
    ];

    /// The 2-bit code sent to the panel
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a raw value, anything above two bits is masked off
    pub const fn from_code(raw: u8) -> Self {
        match raw & 0b11 {
            0b00 => QuadColor::Black,
            0b01 => QuadColor::White,
            0b10 => QuadColor::Yellow,
            _ => QuadColor::Red,
        }
    }

    /// Byte holding four pixels of this color
    pub const fn packed_byte(self) -> u8 {
        let c = self.code();
        (c << 6) | (c << 4) | (c << 2) | c
    }
}

impl From<u8> for QuadColor {
    fn from(raw: u8) -> Self {
        QuadColor::from_code(raw)
    }
}

impl PixelColor for QuadColor {
    type Raw = RawU2;
}

impl From<RawU2> for QuadColor {
    fn from(raw: RawU2) -> Self {
        use embedded_graphics::pixelcolor::raw::RawData;
        QuadColor::from_code(raw.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_byte_repeats_the_code() {
        assert_eq!(QuadColor::Black.packed_byte(), 0x00);
        assert_eq!(QuadColor::White.packed_byte(), 0x55);
        assert_eq!(QuadColor::Yellow.packed_byte(), 0xAA);
        assert_eq!(QuadColor::Red.packed_byte(), 0xFF);
    }

    #[test]
    fn out_of_range_codes_are_masked() {
        assert_eq!(QuadColor::from(0x07), QuadColor::Red);
        assert_eq!(QuadColor::from(0xFC), QuadColor::Black);
        assert_eq!(QuadColor::from(0x05), QuadColor::White);
    }

    #[test]
    fn code_round_trips() {
        for color in QuadColor::ALL {
            assert_eq!(QuadColor::from_code(color.code()), color);
        }
    }
}
