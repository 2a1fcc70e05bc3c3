//! Boiler temperature on a Waveshare 2.66" (G) four-color e-paper panel
//!
//! The firmware in `main.rs` subscribes to an MQTT topic and redraws the panel
//! whenever the published temperature changes. Everything in this library is
//! plain `embedded-hal` and `embedded-graphics` so it can be tested on the host.

pub mod battery;
pub mod config;
pub mod epd2in66g;
pub mod graphics;
pub mod screen;
pub mod update;

pub use crate::epd2in66g::color::QuadColor;
pub use crate::epd2in66g::driver::{Epd2in66g, PanelState};
pub use crate::epd2in66g::error::EpdError;
pub use crate::graphics::Framebuffer;
pub use crate::update::{show_temperature, LastDisplayed, Outcome, ShowOptions, UpdateContext};
