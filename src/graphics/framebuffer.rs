//! Packed 2-bit frame buffer with a rotated landscape coordinate system
//!
//! The panel is addressed in its native portrait orientation (184x360). All drawing
//! happens in a 360x184 landscape space rotated 90° clockwise onto it:
//!
//! ```text
//! native_x = logical_y
//! native_y = native_height - 1 - logical_x
//! ```

use embedded_graphics::prelude::*;

use crate::epd2in66g::color::QuadColor;
use crate::epd2in66g::{HEIGHT, WIDTH};

/// Logical canvas width, the native height
pub const LOGICAL_WIDTH: i32 = HEIGHT as i32;

/// Logical canvas height, the native width
pub const LOGICAL_HEIGHT: i32 = WIDTH as i32;

/// Full frame for the panel, four pixels per byte, MSB first, row-major in native order
pub struct Framebuffer {
    buffer: Box<[u8]>,
    native_width: usize,
    native_height: usize,
    row_bytes: usize,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer::new()
    }
}

impl Framebuffer {
    /// Buffer for the 2.66" (G) panel, filled white
    pub fn new() -> Self {
        Self::with_native_size(WIDTH as usize, HEIGHT as usize)
    }

    /// Buffer for a panel of any native size, filled white
    pub fn with_native_size(native_width: usize, native_height: usize) -> Self {
        let row_bytes = native_width.div_ceil(4);
        Framebuffer {
            buffer: vec![QuadColor::White.packed_byte(); row_bytes * native_height]
                .into_boxed_slice(),
            native_width,
            native_height,
            row_bytes,
        }
    }

    /// Packed bytes, ready to be streamed to the panel
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Native (portrait) width and height
    pub fn native_size(&self) -> (usize, usize) {
        (self.native_width, self.native_height)
    }

    /// Logical (landscape) width and height
    pub fn logical_size(&self) -> (usize, usize) {
        (self.native_height, self.native_width)
    }

    /// Map a logical coordinate to native, `None` when it falls off the panel
    pub fn to_native(&self, lx: i32, ly: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(ly).ok()?;
        let y = (self.native_height as i64 - 1 - lx as i64)
            .try_into()
            .ok()
            .filter(|y: &usize| *y < self.native_height)?;
        (x < self.native_width).then_some((x, y))
    }

    /// Byte index and bit shift of a native pixel
    fn locate(&self, x: usize, y: usize) -> (usize, u32) {
        let index = y * self.row_bytes + x / 4;
        let shift = ((3 - (x % 4)) * 2) as u32;
        (index, shift)
    }

    /// Set one pixel in logical coordinates, silently clipped
    pub fn set_pixel(&mut self, lx: i32, ly: i32, color: QuadColor) {
        let Some((x, y)) = self.to_native(lx, ly) else {
            return;
        };
        let (index, shift) = self.locate(x, y);
        let byte = &mut self.buffer[index];
        *byte = (*byte & !(0b11 << shift)) | (color.code() << shift);
    }

    /// Read one pixel in logical coordinates
    pub fn pixel(&self, lx: i32, ly: i32) -> Option<QuadColor> {
        let (x, y) = self.to_native(lx, ly)?;
        let (index, shift) = self.locate(x, y);
        Some(QuadColor::from_code(self.buffer[index] >> shift))
    }

    /// Set every pixel to one color
    pub fn fill(&mut self, color: QuadColor) {
        self.buffer.fill(color.packed_byte());
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        let (w, h) = self.logical_size();
        Size::new(w as u32, h as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = QuadColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}
