//! 2.66" (G) Display Driver Implementation
//!
//! This module contains the protocol driver for the four-color panel. It owns the
//! panel state and sequences power, reset, register programming, frame transfer
//! and power off.
//!
//! ## Operation order
//!
//! ```text
//! Uninitialized -> init() -> Idle -> clear()/display()/display_partial() -> Idle -> sleep() -> Sleeping
//!        ^                                                                                    |
//!        +---------------------------------- init() ------------------------------------------+
//! ```
//!
//! Calling a transfer or `sleep()` outside of `Idle` is rejected with
//! [`EpdError::WrongState`]. Any failure half way through a sequence drops the
//! driver back to `Uninitialized`, the panel has to be initialized again.
//!
//! ## Critical Implementation Details
//!
//! ### Power cycle on init
//!
//! After `POWER_OFF` some panels do not wake up reliably from a reset pulse alone.
//! `init()` therefore drops the power-enable line for 80 ms first.
//!
//! ### No deep sleep command
//!
//! `sleep()` only sends `POWER_OFF`. The deep sleep command would need another
//! reset to leave, and the next `init()` power cycles the panel anyway.
//!
//! ### BUSY Pin Wait
//!
//! The busy line is LOW while the controller works. Every wait is bounded by
//! the driver's busy timeout, a refresh of this panel takes roughly 15 seconds.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::epd2in66g::color::QuadColor;
use crate::epd2in66g::error::EpdError;
use crate::epd2in66g::interface::{BusyPolarity, DisplayInterface};
use crate::epd2in66g::{cmd::Cmd, flag::Flag, FRAME_BYTES, HEIGHT, ROW_BYTES, WIDTH};

/// Default upper bound for a single busy wait
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(60);

/// Settling time around the power-enable toggle
const POWER_CYCLE_MS: u32 = 80;

/// Where the driver is in the panel protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelState {
    /// Nothing sent yet, or the last sequence failed
    Uninitialized,
    /// Power cycle and reset pulse in progress
    Resetting,
    /// Register programming in progress
    Configuring,
    /// Powered on and ready for a frame
    Idle,
    /// Frame data is being streamed or refreshed
    Transferring,
    /// Powered off, needs `init()` before the next frame
    Sleeping,
}

/// Driver for the Waveshare 2.66" (G) four-color panel
///
/// ## Type Parameters
///
/// - `SPI` - SPI device for communication, owns chip select
/// - `BSY` - BUSY input pin (LOW when display is busy)
/// - `DC` - Data/Command output pin
/// - `RST` - Reset output pin
/// - `PWR` - Panel power-enable output pin
/// - `DELAY` - Delay provider for timing
pub struct Epd2in66g<SPI, BSY, DC, RST, PWR, DELAY> {
    interface: DisplayInterface<SPI, BSY, DC, RST, PWR, DELAY>,
    state: PanelState,
    busy_timeout: Duration,
}

impl<SPI, BSY, DC, RST, PWR, DELAY> Epd2in66g<SPI, BSY, DC, RST, PWR, DELAY>
where
    SPI: SpiDevice,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DELAY: DelayNs,
{
    /// Create the driver, the panel is left untouched until [`Self::init`]
    pub fn new(spi: SPI, busy: BSY, dc: DC, rst: RST, pwr: PWR, delay: DELAY) -> Self {
        Self::from_interface(DisplayInterface::new(spi, busy, dc, rst, pwr, delay))
    }

    /// Create a new instance from an existing interface without initialization
    pub fn from_interface(interface: DisplayInterface<SPI, BSY, DC, RST, PWR, DELAY>) -> Self {
        Epd2in66g {
            interface,
            state: PanelState::Uninitialized,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Replace the upper bound applied to every busy wait
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Current protocol state
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Give back the owned peripherals
    pub fn release(self) -> (SPI, BSY, DC, RST, PWR, DELAY) {
        self.interface.release()
    }

    /// Power cycle, reset and configure the panel, then power it on.
    ///
    /// Valid from every state. Only line/bus failures and a busy line that never
    /// releases are reported, register writes have no acknowledgement.
    pub fn init(&mut self) -> Result<(), EpdError> {
        log::info!("Initializing 2.66\" (G) e-paper panel");
        self.state = PanelState::Resetting;

        self.run(|epd| {
            epd.interface.init_lines()?;

            epd.interface.set_power(false)?;
            epd.interface.delay_ms(POWER_CYCLE_MS);
            epd.interface.set_power(true)?;
            epd.interface.delay_ms(POWER_CYCLE_MS);

            epd.interface.reset()?;
            epd.wait_while_busy(BusyPolarity::BusyLow)?;

            epd.state = PanelState::Configuring;
            epd.configure()?;

            epd.send_command(Cmd::POWER_ON)?;
            epd.wait_while_busy(BusyPolarity::BusyLow)?;

            epd.state = PanelState::Idle;
            log::info!("Panel initialized");
            Ok(())
        })
    }

    /// Program timing, power rails, booster, interface and resolution registers
    fn configure(&mut self) -> Result<(), EpdError> {
        let i = &mut self.interface;
        i.cmd_with_data(Cmd::VENDOR_4D, &[Flag::VENDOR_4D])?;
        i.cmd_with_data(Cmd::PANEL_SETTING, &Flag::PANEL_SETTING)?;
        i.cmd_with_data(Cmd::POWER_SETTING, &Flag::POWER_SETTING)?;
        i.cmd_with_data(Cmd::POWER_OFF_SEQUENCE, &Flag::POWER_OFF_SEQUENCE)?;
        i.cmd_with_data(Cmd::BOOSTER_SOFT_START, &Flag::BOOSTER_SOFT_START)?;
        i.cmd_with_data(Cmd::VCOM_DATA_INTERVAL, &[Flag::VCOM_DATA_INTERVAL])?;
        i.cmd_with_data(Cmd::TCON_SETTING, &Flag::TCON_SETTING)?;

        let [w_hi, w_lo] = WIDTH.to_be_bytes();
        let [h_hi, h_lo] = HEIGHT.to_be_bytes();
        i.cmd_with_data(Cmd::RESOLUTION_SETTING, &[w_hi, w_lo, h_hi, h_lo])?;

        i.cmd_with_data(Cmd::VENDOR_E7, &[Flag::VENDOR_E7])?;
        i.cmd_with_data(Cmd::VENDOR_E3, &[Flag::VENDOR_E3])?;
        i.cmd_with_data(Cmd::VENDOR_B4, &[Flag::VENDOR_B4])?;
        i.cmd_with_data(Cmd::VENDOR_B5, &[Flag::VENDOR_B5])?;
        i.cmd_with_data(Cmd::VENDOR_E9, &[Flag::VENDOR_E9])?;
        i.cmd_with_data(Cmd::PLL_CONTROL, &[Flag::PLL_CONTROL])?;
        Ok(())
    }

    /// Send a single opcode, DC low
    pub fn send_command(&mut self, command: u8) -> Result<(), EpdError> {
        Ok(self.interface.cmd(command)?)
    }

    /// Send a single parameter or pixel byte, DC high
    pub fn send_data(&mut self, data: u8) -> Result<(), EpdError> {
        Ok(self.interface.data(data)?)
    }

    /// Block until the busy line signals idle, bounded by the busy timeout
    pub fn wait_while_busy(&mut self, polarity: BusyPolarity) -> Result<(), EpdError> {
        let timeout = self.busy_timeout;
        self.interface.wait_while_busy(polarity, timeout)
    }

    /// Fill the whole panel with one color and refresh
    pub fn clear(&mut self, color: QuadColor) -> Result<(), EpdError> {
        self.expect_state(PanelState::Idle)?;
        log::info!("Clearing panel to {:?}", color);

        self.transfer(|epd| {
            epd.send_command(Cmd::DATA_START_TRANSMISSION)?;
            epd.interface.data_x_times(color.packed_byte(), FRAME_BYTES)?;
            Ok(())
        })
    }

    /// Stream a full packed frame and refresh
    pub fn display(&mut self, buffer: &[u8]) -> Result<(), EpdError> {
        self.expect_state(PanelState::Idle)?;
        if buffer.len() != FRAME_BYTES {
            return Err(EpdError::BufferSize {
                expected: FRAME_BYTES,
                actual: buffer.len(),
            });
        }
        log::info!("Writing {} byte frame", buffer.len());

        self.transfer(|epd| {
            epd.send_command(Cmd::DATA_START_TRANSMISSION)?;
            epd.interface.data_stream(buffer.iter().copied())?;
            Ok(())
        })
    }

    /// Stream a full frame where only the window at native (`x`, `y`) of `w` x `h`
    /// pixels comes from `buffer`, everything else is white.
    ///
    /// `buffer` is packed row by row with `w / 4` bytes per row. The whole frame is
    /// still transmitted, the controller has no windowed write.
    pub fn display_partial(
        &mut self,
        buffer: &[u8],
        x: u16,
        y: u16,
        w: u16,
        h: u16,
    ) -> Result<(), EpdError> {
        self.expect_state(PanelState::Idle)?;

        let window = PartialWindow::new(x, y, w, h);
        let needed = window.required_len();
        if buffer.len() < needed {
            return Err(EpdError::BufferSize {
                expected: needed,
                actual: buffer.len(),
            });
        }
        log::info!("Writing partial window {}x{} at ({}, {})", w, h, x, y);

        self.transfer(|epd| {
            epd.send_command(Cmd::DATA_START_TRANSMISSION)?;
            let bytes = (0..HEIGHT as usize).flat_map(move |row| {
                (0..ROW_BYTES).map(move |col| match window.index(row, col) {
                    Some(index) => buffer[index],
                    None => Flag::PARTIAL_FILL,
                })
            });
            epd.interface.data_stream(bytes)?;
            Ok(())
        })
    }

    /// Power the panel off. `init()` is required before the next frame
    pub fn sleep(&mut self) -> Result<(), EpdError> {
        self.expect_state(PanelState::Idle)?;
        log::info!("Powering panel off");

        self.run(|epd| {
            epd.interface
                .cmd_with_data(Cmd::POWER_OFF, &[Flag::POWER_OFF])?;
            epd.wait_while_busy(BusyPolarity::BusyLow)?;
            epd.interface.delay_ms(10);
            epd.state = PanelState::Sleeping;
            Ok(())
        })
    }

    /// Kick off the refresh of what was streamed and wait for it to finish
    fn refresh(&mut self) -> Result<(), EpdError> {
        self.interface
            .cmd_with_data(Cmd::DISPLAY_REFRESH, &[Flag::REFRESH_NORMAL])?;
        self.wait_while_busy(BusyPolarity::BusyLow)
    }

    /// Frame transfer followed by refresh, `Idle` again afterwards
    fn transfer<F>(&mut self, stream: F) -> Result<(), EpdError>
    where
        F: FnOnce(&mut Self) -> Result<(), EpdError>,
    {
        self.state = PanelState::Transferring;
        self.run(|epd| {
            stream(epd)?;
            epd.refresh()?;
            epd.state = PanelState::Idle;
            Ok(())
        })
    }

    /// Drop back to `Uninitialized` when a sequence fails half way
    fn run<F>(&mut self, sequence: F) -> Result<(), EpdError>
    where
        F: FnOnce(&mut Self) -> Result<(), EpdError>,
    {
        let result = sequence(self);
        if let Err(e) = &result {
            log::error!("Panel sequence failed in {:?}: {}", self.state, e);
            self.state = PanelState::Uninitialized;
        }
        result
    }

    fn expect_state(&self, expected: PanelState) -> Result<(), EpdError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EpdError::WrongState {
                expected,
                actual: self.state,
            })
        }
    }
}

/// Byte window of a partial transfer in native coordinates
#[derive(Clone, Copy, Debug)]
struct PartialWindow {
    row_start: usize,
    row_end: usize,
    col_start: usize,
    col_end: usize,
    stride: usize,
}

impl PartialWindow {
    fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        let (x, y, w, h) = (x as usize, y as usize, w as usize, h as usize);
        PartialWindow {
            row_start: y,
            row_end: (y + h).min(HEIGHT as usize),
            col_start: x / 4,
            col_end: ((x + w) / 4).min(ROW_BYTES),
            stride: w / 4,
        }
    }

    /// Index into the caller buffer for a frame byte, `None` outside the window
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        let inside = (self.row_start..self.row_end).contains(&row)
            && (self.col_start..self.col_end).contains(&col);
        inside.then(|| (col - self.col_start) + self.stride * (row - self.row_start))
    }

    /// Smallest caller buffer that covers every window byte
    fn required_len(&self) -> usize {
        if self.row_start >= self.row_end || self.col_start >= self.col_end {
            return 0;
        }
        (self.col_end - 1 - self.col_start) + self.stride * (self.row_end - 1 - self.row_start) + 1
    }
}
