//! From an incoming payload to pixels on the panel
//!
//! [`UpdateContext::handle_payload`] decides whether a message changes the screen and
//! which trend arrow goes with it, [`show_temperature`] runs the panel sequence and
//! [`UpdateContext::commit`] records the value once it is on the panel.

use core::fmt;
use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::epd2in66g::color::QuadColor;
use crate::epd2in66g::driver::Epd2in66g;
use crate::epd2in66g::error::EpdError;
use crate::graphics::Framebuffer;
use crate::screen::{compose_frame, Arrow, Theme};

/// Longest payload considered a temperature
pub const MAX_PAYLOAD_LEN: usize = 32;

/// Values Home Assistant publishes when the sensor has no reading
pub const SENTINEL_TOKENS: [&str; 6] = ["unknown", "unavailable", "None", "null", "nan", "NaN"];

/// Why a payload was not accepted as a temperature
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadError {
    Empty,
    TooLong(usize),
    Sentinel,
    NotANumber,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadError::Empty => write!(f, "empty payload"),
            PayloadError::TooLong(len) => write!(f, "payload of {} bytes is too long", len),
            PayloadError::Sentinel => write!(f, "sensor reports no value"),
            PayloadError::NotANumber => write!(f, "payload does not start with an integer"),
        }
    }
}

impl std::error::Error for PayloadError {}

/// Parse a whole-degree temperature from a payload.
///
/// Leading whitespace and a sign are accepted, parsing stops at the first non-digit
/// so `"38.6"` reads as 38. Values beyond `i32` saturate.
pub fn parse_temperature(payload: &[u8]) -> Result<i32, PayloadError> {
    if payload.is_empty() {
        return Err(PayloadError::Empty);
    }
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(PayloadError::TooLong(payload.len()));
    }
    if SENTINEL_TOKENS.iter().any(|token| token.as_bytes() == payload) {
        return Err(PayloadError::Sentinel);
    }

    // Bytes after the number are never looked at, they need not be text
    let rest = match payload.iter().position(|b| !is_c_space(*b)) {
        Some(start) => &payload[start..],
        None => return Err(PayloadError::NotANumber),
    };
    let (negative, rest) = match rest.split_first() {
        Some((&b'-', tail)) => (true, tail),
        Some((&b'+', tail)) => (false, tail),
        _ => (false, rest),
    };

    let digits: Vec<u8> = rest
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .map(|b| b - b'0')
        .collect();
    if digits.is_empty() {
        return Err(PayloadError::NotANumber);
    }

    let magnitude = digits.iter().fold(0i64, |acc, d| {
        acc.saturating_mul(10).saturating_add(i64::from(*d))
    });
    let value = if negative { -magnitude } else { magnitude };
    Ok(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

/// Whitespace as C's `isspace` sees it, vertical tab included
fn is_c_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0B
}

/// Last temperature put on the panel, kept across deep sleep.
///
/// The raw form is what lives in RTC memory, [`LastDisplayed::NEVER`] marks a cold
/// boot where nothing has been shown yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LastDisplayed(Option<i32>);

impl LastDisplayed {
    /// Raw slot value for "never displayed"
    pub const NEVER: i32 = -9999;

    pub const fn never() -> Self {
        LastDisplayed(None)
    }

    pub const fn from_raw(raw: i32) -> Self {
        if raw == Self::NEVER {
            LastDisplayed(None)
        } else {
            LastDisplayed(Some(raw))
        }
    }

    pub const fn into_raw(self) -> i32 {
        match self.0 {
            Some(value) => value,
            None => Self::NEVER,
        }
    }

    pub const fn value(self) -> Option<i32> {
        self.0
    }

    /// Trend from the last shown value, no arrow on the first reading
    pub fn arrow_to(self, next: i32) -> Arrow {
        match self.0 {
            Some(prev) if next > prev => Arrow::Up,
            Some(prev) if next < prev => Arrow::Down,
            _ => Arrow::None,
        }
    }
}

/// What to do with an accepted reading
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Same value as on the panel, nothing to redraw
    Unchanged,
    /// Draw `value` with the given trend arrow
    Render { value: i32, arrow: Arrow },
}

/// Result of one incoming message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Rejected(PayloadError),
    Unchanged(i32),
    Render { value: i32, arrow: Arrow },
}

/// Update state carried between messages
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateContext {
    last: LastDisplayed,
}

impl UpdateContext {
    pub fn new(last: LastDisplayed) -> Self {
        UpdateContext { last }
    }

    pub fn last_displayed(&self) -> LastDisplayed {
        self.last
    }

    /// Compare a reading with what the panel shows, no state change
    pub fn evaluate(&self, value: i32) -> Decision {
        if self.last.value() == Some(value) {
            Decision::Unchanged
        } else {
            Decision::Render {
                value,
                arrow: self.last.arrow_to(value),
            }
        }
    }

    /// Remember `value` as shown, only once the panel update succeeded
    pub fn commit(&mut self, value: i32) {
        self.last = LastDisplayed(Some(value));
    }

    /// Parse and compare a payload.
    ///
    /// Nothing is remembered here: the caller [`commit`](Self::commit)s the value after
    /// [`show_temperature`] succeeded, so a failed update is retried on the next delivery.
    pub fn handle_payload(&mut self, payload: &[u8]) -> Outcome {
        let value = match parse_temperature(payload) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Payload ignored: {}", e);
                return Outcome::Rejected(e);
            }
        };

        match self.evaluate(value) {
            Decision::Unchanged => {
                log::info!("Temperature unchanged at {}", value);
                Outcome::Unchanged(value)
            }
            Decision::Render { value, arrow } => {
                log::info!(
                    "Temperature changed: {:?} -> {}",
                    self.last.value(),
                    value
                );
                Outcome::Render { value, arrow }
            }
        }
    }
}

/// How a reading is put on the panel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShowOptions {
    /// Flash the header white before the themed frame
    pub transition: bool,
    /// Pause between the white and the themed frame
    pub transition_delay: Duration,
    /// Battery gauge percentage, `None` hides it
    pub battery: Option<u8>,
}

impl Default for ShowOptions {
    fn default() -> Self {
        ShowOptions {
            transition: true,
            transition_delay: Duration::from_millis(250),
            battery: None,
        }
    }
}

/// Power up the panel, draw the reading and power it off again.
///
/// The panel is cleared white first. With a transition the frame is shown once with
/// a white header, then with the themed header. A failing `init()` aborts the whole
/// update, the caller retries on the next message.
pub fn show_temperature<SPI, BSY, DC, RST, PWR, DELAY>(
    epd: &mut Epd2in66g<SPI, BSY, DC, RST, PWR, DELAY>,
    fb: &mut Framebuffer,
    delay: &mut impl DelayNs,
    temp_c: i32,
    arrow: Arrow,
    options: &ShowOptions,
) -> Result<(), EpdError>
where
    SPI: SpiDevice,
    BSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    PWR: OutputPin,
    DELAY: DelayNs,
{
    log::info!("Start update -> {}", temp_c);
    epd.init()?;
    epd.clear(QuadColor::White)?;

    if options.transition {
        log::info!("Frame 1 (white header)");
        compose_frame(fb, temp_c, options.battery, arrow, Some(QuadColor::White));
        epd.display(fb.buffer())?;
        delay.delay_ms(u32::try_from(options.transition_delay.as_millis()).unwrap_or(u32::MAX));
    }

    log::info!("Frame {} (final header)", if options.transition { 2 } else { 1 });
    let theme = Theme::for_temperature(temp_c);
    compose_frame(fb, temp_c, options.battery, arrow, Some(theme.header_bg));
    epd.display(fb.buffer())?;

    epd.sleep()?;
    log::info!("Update done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epd2in66g::cmd::Cmd;
    use crate::epd2in66g::driver::PanelState;
    use crate::epd2in66g::mock::{Bus, Event};

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn parses_plain_and_signed_integers() {
        assert_eq!(parse_temperature(b"38"), Ok(38));
        assert_eq!(parse_temperature(b"-5"), Ok(-5));
        assert_eq!(parse_temperature(b"+7"), Ok(7));
        assert_eq!(parse_temperature(b"  42"), Ok(42));
    }

    #[test]
    fn trailing_text_after_the_number_is_ignored() {
        assert_eq!(parse_temperature(b"38.6"), Ok(38));
        assert_eq!(parse_temperature(b"40C"), Ok(40));
    }

    #[test]
    fn sentinels_are_rejected_case_sensitively() {
        for token in SENTINEL_TOKENS {
            assert_eq!(
                parse_temperature(token.as_bytes()),
                Err(PayloadError::Sentinel),
                "{}",
                token
            );
        }
        // Not a sentinel, but not a number either
        assert_eq!(parse_temperature(b"Unknown"), Err(PayloadError::NotANumber));
        assert_eq!(parse_temperature(b"NAN"), Err(PayloadError::NotANumber));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_temperature(b""), Err(PayloadError::Empty));
        assert_eq!(parse_temperature(b"-"), Err(PayloadError::NotANumber));
        assert_eq!(parse_temperature(b"abc"), Err(PayloadError::NotANumber));
        assert_eq!(parse_temperature(&[0xFF, 0xFE]), Err(PayloadError::NotANumber));
        assert_eq!(parse_temperature(b" \t\n"), Err(PayloadError::NotANumber));
        assert_eq!(
            parse_temperature(&[b'1'; 33]),
            Err(PayloadError::TooLong(33))
        );
    }

    #[test]
    fn bytes_after_the_number_need_not_be_text() {
        assert_eq!(parse_temperature(b"38\xff"), Ok(38));
        assert_eq!(parse_temperature(b"\x0b-4\xfe\xfd"), Ok(-4));
        assert_eq!(parse_temperature(b"nan\xff"), Err(PayloadError::NotANumber));
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(parse_temperature(b"99999999999"), Ok(i32::MAX));
        assert_eq!(parse_temperature(b"-99999999999"), Ok(i32::MIN));
    }

    #[test]
    fn retained_slot_round_trips_through_raw() {
        assert_eq!(LastDisplayed::from_raw(LastDisplayed::NEVER), LastDisplayed::never());
        assert_eq!(LastDisplayed::never().into_raw(), -9999);
        assert_eq!(LastDisplayed::from_raw(41).value(), Some(41));
    }

    #[test]
    fn arrow_follows_the_trend() {
        assert_eq!(LastDisplayed::never().arrow_to(5), Arrow::None);
        assert_eq!(LastDisplayed::from_raw(35).arrow_to(38), Arrow::Up);
        assert_eq!(LastDisplayed::from_raw(38).arrow_to(35), Arrow::Down);
    }

    #[test]
    fn warm_reading_after_cooler_one_goes_up_in_yellow() {
        let mut ctx = UpdateContext::new(LastDisplayed::never());
        assert!(matches!(ctx.handle_payload(b"35"), Outcome::Render { value: 35, .. }));
        ctx.commit(35);

        let outcome = ctx.handle_payload(b"38");

        assert_eq!(outcome, Outcome::Render { value: 38, arrow: Arrow::Up });
        let theme = Theme::for_temperature(38);
        assert_eq!((theme.header_bg, theme.header_fg), (QuadColor::Yellow, QuadColor::Black));
    }

    #[test]
    fn unavailable_changes_nothing() {
        let mut ctx = UpdateContext::new(LastDisplayed::from_raw(40));

        let outcome = ctx.handle_payload(b"unavailable");

        assert_eq!(outcome, Outcome::Rejected(PayloadError::Sentinel));
        assert_eq!(ctx.last_displayed().value(), Some(40));
    }

    #[test]
    fn repeated_value_is_suppressed() {
        let mut ctx = UpdateContext::default();
        assert!(matches!(ctx.handle_payload(b"41"), Outcome::Render { value: 41, .. }));
        ctx.commit(41);

        assert_eq!(ctx.handle_payload(b"41"), Outcome::Unchanged(41));
        assert_eq!(ctx.evaluate(41), Decision::Unchanged);
    }

    #[test]
    fn handling_a_payload_does_not_mark_it_displayed() {
        let mut ctx = UpdateContext::new(LastDisplayed::from_raw(35));

        ctx.handle_payload(b"41");

        assert_eq!(ctx.last_displayed().value(), Some(35));
    }

    #[test]
    fn failed_update_is_retried_on_the_next_delivery() {
        let mut ctx = UpdateContext::new(LastDisplayed::from_raw(35));
        let bus = Bus::new().stuck_busy();
        let mut epd = bus.epd().with_busy_timeout(Duration::from_millis(10));
        let mut fb = Framebuffer::new();

        let Outcome::Render { value, arrow } = ctx.handle_payload(b"41") else {
            panic!("41 after 35 must be drawn");
        };
        let options = ShowOptions::default();
        let shown = show_temperature(&mut epd, &mut fb, &mut NoDelay, value, arrow, &options);
        assert!(shown.is_err());

        // Same value again, still measured against what the panel really shows
        assert_eq!(
            ctx.handle_payload(b"41"),
            Outcome::Render { value: 41, arrow: Arrow::Up }
        );
    }

    #[test]
    fn first_reading_has_no_arrow() {
        let mut ctx = UpdateContext::new(LastDisplayed::never());

        let outcome = ctx.handle_payload(b"5");

        assert_eq!(outcome, Outcome::Render { value: 5, arrow: Arrow::None });
        let theme = Theme::for_temperature(5);
        assert_eq!((theme.header_bg, theme.header_fg), (QuadColor::Black, QuadColor::White));
    }

    #[test]
    fn show_runs_init_clear_two_frames_and_sleep() {
        let bus = Bus::new();
        let mut epd = bus.epd();
        let mut fb = Framebuffer::new();

        show_temperature(&mut epd, &mut fb, &mut NoDelay, 38, Arrow::Up, &ShowOptions::default())
            .unwrap();

        let commands: Vec<u8> = bus
            .wire()
            .into_iter()
            .filter_map(|e| match e {
                Event::Command(c) => Some(c),
                _ => None,
            })
            .filter(|c| {
                [
                    Cmd::POWER_ON,
                    Cmd::DATA_START_TRANSMISSION,
                    Cmd::DISPLAY_REFRESH,
                    Cmd::POWER_OFF,
                ]
                .contains(c)
            })
            .collect();
        assert_eq!(
            commands,
            vec![
                Cmd::POWER_ON,
                Cmd::DATA_START_TRANSMISSION,
                Cmd::DISPLAY_REFRESH,
                Cmd::DATA_START_TRANSMISSION,
                Cmd::DISPLAY_REFRESH,
                Cmd::DATA_START_TRANSMISSION,
                Cmd::DISPLAY_REFRESH,
                Cmd::POWER_OFF,
            ]
        );
        assert_eq!(epd.state(), PanelState::Sleeping);

        // The last frame sent is the themed one
        let mut expected = Framebuffer::new();
        compose_frame(&mut expected, 38, None, Arrow::Up, None);
        assert_eq!(bus.data_after(Cmd::DATA_START_TRANSMISSION), expected.buffer());
    }

    #[test]
    fn show_without_transition_sends_one_frame() {
        let bus = Bus::new();
        let mut epd = bus.epd();
        let mut fb = Framebuffer::new();
        let options = ShowOptions {
            transition: false,
            ..ShowOptions::default()
        };

        show_temperature(&mut epd, &mut fb, &mut NoDelay, 20, Arrow::None, &options).unwrap();

        let frames = bus
            .wire()
            .into_iter()
            .filter(|e| *e == Event::Command(Cmd::DATA_START_TRANSMISSION))
            .count();
        // clear plus the final frame
        assert_eq!(frames, 2);
    }

    #[test]
    fn failed_init_aborts_the_update() {
        let bus = Bus::new().stuck_busy();
        let mut epd = bus.epd().with_busy_timeout(Duration::from_millis(10));
        let mut fb = Framebuffer::new();

        let result = show_temperature(
            &mut epd,
            &mut fb,
            &mut NoDelay,
            38,
            Arrow::None,
            &ShowOptions::default(),
        );

        assert!(matches!(result, Err(EpdError::BusyTimeout(_))));
        assert!(!bus
            .wire()
            .contains(&Event::Command(Cmd::DATA_START_TRANSMISSION)));
    }
}
