#[cfg(target_os = "espidf")]
mod mqtt;
#[cfg(target_os = "espidf")]
mod wifi;

#[cfg(target_os = "espidf")]
mod firmware {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::time::{Duration, Instant};

    use anyhow::{Context, Result};
    use esp_idf_svc::hal::delay::{Delay, FreeRtos};
    use esp_idf_svc::hal::gpio::{self, PinDriver, Pull};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::prelude::*;
    use esp_idf_svc::hal::reset::ResetReason;
    use esp_idf_svc::hal::spi;
    use esp_idf_svc::sys;

    use boiler_epaper::battery;
    use boiler_epaper::config::{self, Config};
    use boiler_epaper::epd2in66g::driver::Epd2in66g;
    use boiler_epaper::epd2in66g::pins::Pins;
    use boiler_epaper::update::{show_temperature, LastDisplayed, Outcome, UpdateContext};
    use boiler_epaper::Framebuffer;

    use crate::mqtt::{Message, MqttLink};
    use crate::wifi::{WifiNetwork, WifiStation};

    /// Last shown temperature, survives deep sleep but not a power cycle
    #[link_section = ".rtc.data"]
    static RTC_LAST_DISPLAYED: AtomicI32 = AtomicI32::new(LastDisplayed::NEVER);

    /// GPIO34 is ADC1 channel 6 on the ESP32
    const BATTERY_ADC_CHANNEL: sys::adc_channel_t = sys::adc_channel_t_ADC_CHANNEL_6;
    const ADC_WIDTH_BIT_12: u32 = 3;
    const ADC_ATTEN_DB_11: u32 = 3;

    pub fn run() -> Result<()> {
        let config = Config::from_build_env();
        config.validate().context("Incomplete build configuration")?;

        let reset_reason = ResetReason::get();
        log::info!("Reset reason: {:?}", reset_reason);
        if !matches!(reset_reason, ResetReason::DeepSleep) {
            RTC_LAST_DISPLAYED.store(LastDisplayed::NEVER, Ordering::Relaxed);
        }
        let mut context = UpdateContext::new(LastDisplayed::from_raw(
            RTC_LAST_DISPLAYED.load(Ordering::Relaxed),
        ));
        log::info!("Last displayed: {:?}", context.last_displayed().value());

        let peripherals = Peripherals::take().context("Could not take peripherals")?;
        let pins = peripherals.pins;

        log::info!(
            "Configuring SPI: SCK {}, MOSI {}, CS {}",
            Pins::SCK,
            Pins::MOSI,
            Pins::CS
        );
        let spi_device = spi::SpiDeviceDriver::new_single(
            peripherals.spi2,
            pins.gpio18,                    // SCK - Pins::SCK
            pins.gpio23,                    // MOSI - Pins::MOSI
            Option::<gpio::AnyIOPin>::None, // The panel has no MISO
            Some(pins.gpio5),               // CS - Pins::CS
            &spi::SpiDriverConfig::new().dma(spi::Dma::Disabled),
            // Mode0 is the esp-idf-hal default
            &spi::SpiConfig::new().baudrate(2.MHz().into()),
        )
        .context("Could not create SPI device driver")?;

        let mut busy = PinDriver::input(pins.gpio4).context("Busy pin")?; // Pins::BSY
        busy.set_pull(Pull::Up).context("Busy pin pull-up")?;

        let mut epd = Epd2in66g::new(
            spi_device,
            busy,
            PinDriver::output(pins.gpio17).context("DC pin")?, // Pins::DC
            PinDriver::output(pins.gpio16).context("RST pin")?, // Pins::RST
            PinDriver::output(pins.gpio2).context("PWR pin")?, // Pins::PWR
            Delay::new_default(),
        );
        let mut fb = Framebuffer::new();

        if config.battery {
            init_battery_adc();
        }

        let network = WifiNetwork::new(config.wifi_ssid, config.wifi_pass);
        let station = WifiStation::connect(peripherals.modem, &network)?;
        let client_id = config::client_id(&station.mac()?);

        let mut link = MqttLink::start(&config, &client_id)?;
        let started = Instant::now();

        loop {
            let timeout = config
                .deep_sleep
                .then(|| config.idle_before_sleep.saturating_sub(started.elapsed()));

            let message = match link.next(timeout)? {
                Some(message) => message,
                None => {
                    log::info!("No update received, going to sleep");
                    deep_sleep(config.sleep_duration);
                }
            };

            match message {
                Message::Connected => {
                    log::info!("MQTT connected");
                    if let Err(e) = link.subscribe() {
                        log::error!("{:#}", e);
                    }
                }
                Message::Disconnected => {
                    log::warn!("MQTT disconnected, wifi up: {}", station.is_connected());
                }
                Message::Payload(payload) => {
                    log::info!("MQTT {}: {}", config.topic, String::from_utf8_lossy(&payload));

                    let (value, arrow) = match context.handle_payload(&payload) {
                        Outcome::Render { value, arrow } => (value, arrow),
                        Outcome::Unchanged(_) | Outcome::Rejected(_) => continue,
                    };

                    let percent = config.battery.then(|| read_battery_percent(&config)).flatten();
                    let options = config.show_options(percent);
                    match show_temperature(&mut epd, &mut fb, &mut FreeRtos, value, arrow, &options) {
                        Ok(()) => {
                            context.commit(value);
                            RTC_LAST_DISPLAYED
                                .store(context.last_displayed().into_raw(), Ordering::Relaxed);
                        }
                        Err(e) => log::error!("Display update failed, retrying on next message: {}", e),
                    }

                    if config.deep_sleep {
                        deep_sleep(config.sleep_duration);
                    }
                }
            }
        }
    }

    fn init_battery_adc() {
        unsafe {
            sys::adc1_config_width(ADC_WIDTH_BIT_12);
            sys::adc1_config_channel_atten(BATTERY_ADC_CHANNEL, ADC_ATTEN_DB_11);
        }
        log::info!("Battery ADC on GPIO{}", Pins::BAT_ADC);
    }

    fn read_battery_percent(config: &Config) -> Option<u8> {
        let samples: Vec<u16> = (0..config.battery_samples)
            .map(|_| {
                let raw = unsafe { sys::adc1_get_raw(BATTERY_ADC_CHANNEL) };
                FreeRtos::delay_ms(config.battery_sample_interval.as_millis() as u32);
                raw.clamp(0, i32::from(u16::MAX)) as u16
            })
            .collect();

        let avg = battery::average(&samples)?;
        let cal = &config.battery_calibration;
        let percent = cal.percent(avg);
        log::info!("Battery {:.2} V, {}%", cal.volts(avg), percent);
        Some(percent)
    }

    fn deep_sleep(duration: Duration) -> ! {
        log::info!("Going to deep sleep for {} seconds", duration.as_secs());
        unsafe {
            sys::esp_sleep_enable_timer_wakeup(duration.as_micros() as u64);
            sys::esp_deep_sleep_start();
        }
    }
}

// https://docs.esp-rs.org/esp-idf-svc/esp_idf_svc/
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    if let Err(e) = firmware::run() {
        log::error!("Firmware stopped: {:#}", e);
        return Err(e);
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("boiler-epaper only runs on the ESP32, build with the espidf target")
}
