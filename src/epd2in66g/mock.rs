//! Recording fakes for the embedded-hal traits the panel driver needs

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::spi::{self, Operation, SpiDevice};

use crate::epd2in66g::driver::Epd2in66g;
use crate::epd2in66g::interface::DisplayInterface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Command(u8),
    Data(u8),
    Power(bool),
    Reset(bool),
    Delay(u32),
}

#[derive(Default)]
struct Shared {
    events: Vec<Event>,
    dc_high: bool,
    transactions: usize,
    /// Reads of the busy line that still return LOW, `u32::MAX` never releases
    busy_low_reads: u32,
}

/// Shared handle to everything the fake peripherals saw
#[derive(Clone, Default)]
pub struct Bus(Rc<RefCell<Shared>>);

pub struct FakeSpi(Bus);
pub struct FakeBusy(Bus);
pub struct FakeDc(Bus);
pub struct FakeRst(Bus);
pub struct FakePwr(Bus);
pub struct FakeDelay(Bus);

pub type FakeInterface = DisplayInterface<FakeSpi, FakeBusy, FakeDc, FakeRst, FakePwr, FakeDelay>;
pub type FakeEpd = Epd2in66g<FakeSpi, FakeBusy, FakeDc, FakeRst, FakePwr, FakeDelay>;

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Busy line reads LOW for the next `reads` polls
    pub fn busy_for(self, reads: u32) -> Self {
        self.0.borrow_mut().busy_low_reads = reads;
        self
    }

    /// Busy line never leaves LOW
    pub fn stuck_busy(self) -> Self {
        self.busy_for(u32::MAX)
    }

    /// Busy line always HIGH
    pub fn stuck_high(self) -> Self {
        self.busy_for(0)
    }

    pub fn interface(&self) -> FakeInterface {
        DisplayInterface::new(
            FakeSpi(self.clone()),
            FakeBusy(self.clone()),
            FakeDc(self.clone()),
            FakeRst(self.clone()),
            FakePwr(self.clone()),
            FakeDelay(self.clone()),
        )
    }

    /// Interface with a caller supplied power-enable pin
    pub fn interface_with_power<P>(
        &self,
        pwr: P,
    ) -> DisplayInterface<FakeSpi, FakeBusy, FakeDc, FakeRst, P, FakeDelay> {
        DisplayInterface::new(
            FakeSpi(self.clone()),
            FakeBusy(self.clone()),
            FakeDc(self.clone()),
            FakeRst(self.clone()),
            pwr,
            FakeDelay(self.clone()),
        )
    }

    pub fn epd(&self) -> FakeEpd {
        Epd2in66g::new(
            FakeSpi(self.clone()),
            FakeBusy(self.clone()),
            FakeDc(self.clone()),
            FakeRst(self.clone()),
            FakePwr(self.clone()),
            FakeDelay(self.clone()),
        )
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().events.clone()
    }

    /// Only the bytes that went over SPI
    pub fn wire(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::Command(_) | Event::Data(_)))
            .collect()
    }

    /// Data bytes following the last occurrence of `command`, up to the next command
    pub fn data_after(&self, command: u8) -> Vec<u8> {
        let wire = self.wire();
        let start = wire
            .iter()
            .rposition(|e| *e == Event::Command(command))
            .map(|i| i + 1)
            .unwrap_or(wire.len());
        wire[start..]
            .iter()
            .map_while(|e| match e {
                Event::Data(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    pub fn transactions(&self) -> usize {
        self.0.borrow().transactions
    }

    pub fn clear(&self) {
        self.0.borrow_mut().events.clear();
    }

    fn push(&self, event: Event) {
        self.0.borrow_mut().events.push(event);
    }
}

impl spi::ErrorType for FakeSpi {
    type Error = Infallible;
}

impl SpiDevice for FakeSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        let mut shared = self.0 .0.borrow_mut();
        shared.transactions += 1;
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                for &b in bytes.iter() {
                    let event = if shared.dc_high {
                        Event::Data(b)
                    } else {
                        Event::Command(b)
                    };
                    shared.events.push(event);
                }
            }
        }
        Ok(())
    }
}

impl digital::ErrorType for FakeBusy {
    type Error = Infallible;
}

impl InputPin for FakeBusy {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        let mut shared = self.0 .0.borrow_mut();
        match shared.busy_low_reads {
            0 => Ok(true),
            u32::MAX => Ok(false),
            _ => {
                shared.busy_low_reads -= 1;
                Ok(false)
            }
        }
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        self.is_high().map(|high| !high)
    }
}

macro_rules! output_pin {
    ($pin:ident, |$bus:ident, $level:ident| $body:expr) => {
        impl digital::ErrorType for $pin {
            type Error = Infallible;
        }

        impl OutputPin for $pin {
            fn set_low(&mut self) -> Result<(), Infallible> {
                let $bus = &self.0;
                let $level = false;
                $body;
                Ok(())
            }

            fn set_high(&mut self) -> Result<(), Infallible> {
                let $bus = &self.0;
                let $level = true;
                $body;
                Ok(())
            }
        }
    };
}

output_pin!(FakeDc, |bus, level| bus.0.borrow_mut().dc_high = level);
output_pin!(FakeRst, |bus, level| bus.push(Event::Reset(level)));
output_pin!(FakePwr, |bus, level| bus.push(Event::Power(level)));

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.0.push(Event::Delay(ms));
    }
}
