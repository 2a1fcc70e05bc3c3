//! Error types for the e-paper panel driver.

use core::fmt;
use core::time::Duration;

use display_interface::DisplayError;

use crate::epd2in66g::driver::PanelState;

/// Errors that can occur while talking to the panel.
///
/// The panel itself never reports a status byte, so everything here is either
/// a bus/GPIO failure, a busy line that never released, or a caller mistake.
#[derive(Debug)]
pub enum EpdError {
    /// SPI or GPIO failure while driving the panel lines.
    Interface(DisplayError),
    /// The busy line did not signal idle within the configured timeout.
    BusyTimeout(Duration),
    /// An operation was attempted in a state that does not allow it,
    /// e.g. [`display`](crate::epd2in66g::driver::Epd2in66g::display) before
    /// [`init`](crate::epd2in66g::driver::Epd2in66g::init).
    WrongState {
        /// State the operation needs
        expected: PanelState,
        /// State the driver was in
        actual: PanelState,
    },
    /// Frame buffer is too small for the requested transfer.
    BufferSize {
        /// Bytes the transfer reads
        expected: usize,
        /// Bytes the caller supplied
        actual: usize,
    },
}

impl From<DisplayError> for EpdError {
    fn from(e: DisplayError) -> Self {
        EpdError::Interface(e)
    }
}

impl fmt::Display for EpdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpdError::Interface(e) => write!(f, "display interface error: {:?}", e),
            EpdError::BusyTimeout(after) => {
                write!(f, "panel still busy after {} ms", after.as_millis())
            }
            EpdError::WrongState { expected, actual } => {
                write!(f, "panel is {:?}, operation needs {:?}", actual, expected)
            }
            EpdError::BufferSize { expected, actual } => {
                write!(f, "buffer holds {} bytes, transfer needs {}", actual, expected)
            }
        }
    }
}

impl std::error::Error for EpdError {}
