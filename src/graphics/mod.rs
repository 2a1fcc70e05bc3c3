//! Packed frame buffer and the primitives drawn into it

pub mod font;
pub mod framebuffer;
pub mod primitives;

pub use framebuffer::{Framebuffer, LOGICAL_HEIGHT, LOGICAL_WIDTH};
