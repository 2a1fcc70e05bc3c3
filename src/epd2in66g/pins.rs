//! Pin definitions for the 2.66" (G) e-paper display and associated peripherals
//!
//! This module contains all GPIO pin assignments used in the hardware configuration.

/// Pin configuration constants for an ESP32 DevKit wired to the Waveshare e-Paper driver HAT
pub struct Pins;

#[allow(dead_code)]
impl Pins {
    // SPI Display pins
    /// Chip Select pin for SPI display
    pub const CS: u8 = 5;
    /// Data/Command control pin (High for data, Low for command)
    pub const DC: u8 = 17;
    /// Reset pin for display
    pub const RST: u8 = 16;
    /// Busy status pin (Low when display is busy)
    pub const BSY: u8 = 4;
    /// Panel power enable
    pub const PWR: u8 = 2;
    /// SPI Clock pin
    pub const SCK: u8 = 18;
    /// SPI Master Out Slave In
    pub const MOSI: u8 = 23;

    // Other pins
    /// Battery voltage divider, ADC1 channel
    pub const BAT_ADC: u8 = 34;
}
