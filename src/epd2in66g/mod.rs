//! Waveshare 2.66" (G) four-color ePaper Display Driver
//!
//! Black, white, yellow and red on a 184x360 portrait panel, two bits per pixel.
//!
//! This driver is losely modeled after the
//! [epd-waveshare](https://github.com/caemor/epd-waveshare) drivers but built for my needs.
//!
//! ### Usage
//!
//! 1. draw into a [`crate::graphics::Framebuffer`] using logical landscape coordinates
//! 1. call [`driver::Epd2in66g::init`] to power cycle and configure the panel
//! 1. send the frame with [`driver::Epd2in66g::display`], which also triggers the refresh
//! 1. call [`driver::Epd2in66g::sleep`] to power the panel off
//!
//! `init` has to be called again after `sleep`, the panel is woken up by cycling
//! its power-enable line rather than by a deep sleep exit command.

pub mod cmd;
pub mod color;
pub mod driver;
pub mod error;
pub mod flag;
pub mod interface;
pub mod pins;

#[cfg(test)]
pub(crate) mod mock;

/// Display width, pixels horizontally in the native portrait orientation
pub const WIDTH: u16 = 184;

/// Display height, pixels vertically in the native portrait orientation
pub const HEIGHT: u16 = 360;

/// Bytes per native row, four pixels per byte
pub const ROW_BYTES: usize = (WIDTH as usize).div_ceil(4);

/// Size of a full frame in bytes
pub const FRAME_BYTES: usize = ROW_BYTES * HEIGHT as usize;
