//! Display interface using SPI
use core::time::Duration;

use display_interface::DisplayError;
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

use crate::epd2in66g::error::EpdError;

/// Interval between two reads of the busy line
pub const BUSY_POLL_MS: u32 = 5;

/// Level the busy line sits at while the controller is working.
///
/// The 2.66" (G) controller holds the line LOW while busy after reset, power on,
/// refresh and power off. The opposite polarity is kept for controllers that
/// signal busy HIGH during some phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusyPolarity {
    /// LOW means busy, HIGH means idle
    BusyLow,
    /// HIGH means busy, LOW means idle
    BusyHigh,
}

/// The connection interface of the panel: SPI plus four discrete lines.
///
/// Chip select belongs to the [`SpiDevice`], every byte written is its own
/// SPI transaction so no bus state is ever assumed between two calls.
pub struct DisplayInterface<SPI, BSY, DC, RST, PWR, DELAY> {
    /// SPI device, owns chip select
    spi: SPI,
    /// Busy sense input
    busy: BSY,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for Reseting
    rst: RST,
    /// Panel power enable
    pwr: PWR,
    /// Blocking delay provider
    delay: DELAY,
}

impl<SPI, BSY, DC, RST, PWR, DELAY> DisplayInterface<SPI, BSY, DC, RST, PWR, DELAY> {
    /// Bundle the bus, lines and delay, nothing is driven yet
    pub fn new(spi: SPI, busy: BSY, dc: DC, rst: RST, pwr: PWR, delay: DELAY) -> Self {
        DisplayInterface {
            spi,
            busy,
            dc,
            rst,
            pwr,
            delay,
        }
    }

    /// Give back the owned peripherals
    pub fn release(self) -> (SPI, BSY, DC, RST, PWR, DELAY) {
        (self.spi, self.busy, self.dc, self.rst, self.pwr, self.delay)
    }
}

impl<SPI, BSY, DC, RST, PWR, DELAY> DisplayInterface<SPI, BSY, DC, RST, PWR, DELAY>
where
    SPI: SpiDevice,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DELAY: DelayNs,
{
    /// Drive the output lines to their idle levels
    pub(crate) fn init_lines(&mut self) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        // No variant for the power-enable line, it shares RSError with reset
        self.pwr.set_high().map_err(|_| DisplayError::RSError)?;
        Ok(())
    }

    /// Exchange a single byte, framed by its own chip select pulse
    pub(crate) fn write_byte(&mut self, byte: u8) -> Result<(), DisplayError> {
        match self.spi.write(&[byte]) {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("SPI write error for byte 0x{:02X}: {:?}", byte, e);
                Err(DisplayError::BusWriteError)
            }
        }
    }

    /// Basic function for sending commands
    pub(crate) fn cmd(&mut self, command: u8) -> Result<(), DisplayError> {
        // low for commands
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        self.write_byte(command)
    }

    /// Basic function for sending one byte of data
    pub(crate) fn data(&mut self, data: u8) -> Result<(), DisplayError> {
        // high for data
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.write_byte(data)
    }

    /// Send a command and the parameter bytes belonging to it
    pub(crate) fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cmd(command)?;
        for &byte in data {
            self.data(byte)?;
        }
        Ok(())
    }

    /// Stream data bytes, still one transaction per byte
    pub(crate) fn data_stream<I>(&mut self, bytes: I) -> Result<(), DisplayError>
    where
        I: IntoIterator<Item = u8>,
    {
        // high for data
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        for byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Basic function for sending the same byte of data (one u8) multiple times over spi
    /// Used for setting one color for the whole frame
    pub(crate) fn data_x_times(&mut self, val: u8, repetitions: usize) -> Result<(), DisplayError> {
        self.data_stream(core::iter::repeat(val).take(repetitions))
    }

    /// Drive the panel power-enable line
    pub(crate) fn set_power(&mut self, on: bool) -> Result<(), DisplayError> {
        let result = if on {
            self.pwr.set_high()
        } else {
            self.pwr.set_low()
        };
        result.map_err(|e| {
            log::error!("Power-enable line failed: {:?}", e);
            // Reported as RSError, the power cycle belongs to the reset sequence
            DisplayError::RSError
        })
    }

    /// Hardware reset: high, short low pulse, high again
    pub(crate) fn reset(&mut self) -> Result<(), DisplayError> {
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(20);
        self.rst.set_low().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(2);
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(20);
        Ok(())
    }

    /// Read whether the busy line currently signals busy
    pub(crate) fn is_busy(&mut self, polarity: BusyPolarity) -> Result<bool, DisplayError> {
        // Since the DisplayError enum doesn't have a BusyError variant, map to DCError
        let high = self.busy.is_high().map_err(|_| DisplayError::DCError)?;
        Ok(match polarity {
            BusyPolarity::BusyLow => !high,
            BusyPolarity::BusyHigh => high,
        })
    }

    /// Poll the busy line every [`BUSY_POLL_MS`] until it releases or `timeout` passes
    pub(crate) fn wait_while_busy(
        &mut self,
        polarity: BusyPolarity,
        timeout: Duration,
    ) -> Result<(), EpdError> {
        log::debug!("Waiting for busy line ({:?})", polarity);

        let limit_ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let mut waited_ms = 0u32;

        while self.is_busy(polarity)? {
            if waited_ms >= limit_ms {
                log::error!("Busy line did not release after {} ms", waited_ms);
                return Err(EpdError::BusyTimeout(timeout));
            }
            self.delay.delay_ms(BUSY_POLL_MS);
            waited_ms = waited_ms.saturating_add(BUSY_POLL_MS);
        }

        log::debug!("Busy line released after {} ms", waited_ms);
        Ok(())
    }

    /// Blocking delay
    pub(crate) fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
