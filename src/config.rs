//! Build time configuration
//!
//! Credentials and endpoints are baked in from the environment at compile time,
//! e.g. `WIFI_SSID=home WIFI_PASS=secret MQTT_HOST=10.0.0.2 cargo build`.

use core::time::Duration;

use anyhow::{bail, Result};

use crate::battery::BatteryCalibration;
use crate::update::ShowOptions;

pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC: &str = "boiler/temp_int";

/// Everything the firmware needs to know before it touches a peripheral
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub wifi_ssid: &'static str,
    pub wifi_pass: &'static str,
    pub mqtt_host: &'static str,
    pub mqtt_port: u16,
    pub mqtt_user: Option<&'static str>,
    pub mqtt_pass: Option<&'static str>,
    pub topic: &'static str,

    pub transition: bool,
    pub transition_delay: Duration,

    pub deep_sleep: bool,
    pub sleep_duration: Duration,
    /// Time without a message before giving up and sleeping
    pub idle_before_sleep: Duration,

    pub battery: bool,
    pub battery_calibration: BatteryCalibration,
    pub battery_samples: u32,
    pub battery_sample_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            wifi_ssid: "",
            wifi_pass: "",
            mqtt_host: "",
            mqtt_port: DEFAULT_MQTT_PORT,
            mqtt_user: None,
            mqtt_pass: None,
            topic: DEFAULT_TOPIC,
            transition: true,
            transition_delay: Duration::from_millis(250),
            deep_sleep: false,
            sleep_duration: Duration::from_secs(900),
            idle_before_sleep: Duration::from_secs(15),
            battery: false,
            battery_calibration: BatteryCalibration::default(),
            battery_samples: 20,
            battery_sample_interval: Duration::from_millis(2),
        }
    }
}

impl Config {
    /// Configuration compiled into this binary
    pub fn from_build_env() -> Self {
        let defaults = Config::default();
        Config {
            wifi_ssid: option_env!("WIFI_SSID").unwrap_or_default(),
            wifi_pass: option_env!("WIFI_PASS").unwrap_or_default(),
            mqtt_host: option_env!("MQTT_HOST").unwrap_or_default(),
            mqtt_port: parse_port(option_env!("MQTT_PORT")),
            mqtt_user: non_empty(option_env!("MQTT_USER")),
            mqtt_pass: non_empty(option_env!("MQTT_PASS")),
            topic: non_empty(option_env!("MQTT_TOPIC")).unwrap_or(DEFAULT_TOPIC),
            deep_sleep: parse_flag(option_env!("DEEP_SLEEP"), defaults.deep_sleep),
            battery: parse_flag(option_env!("BATTERY"), defaults.battery),
            ..defaults
        }
    }

    /// Fail early with the name of whatever is missing
    pub fn validate(&self) -> Result<()> {
        if self.wifi_ssid.is_empty() {
            bail!("WIFI_SSID is not set");
        }
        if self.mqtt_host.is_empty() {
            bail!("MQTT_HOST is not set");
        }
        if self.mqtt_port == 0 {
            bail!("MQTT_PORT must not be 0");
        }
        if self.topic.is_empty() {
            bail!("MQTT topic is empty");
        }
        if self.mqtt_pass.is_some() && self.mqtt_user.is_none() {
            bail!("MQTT_PASS given without MQTT_USER");
        }
        Ok(())
    }

    pub fn mqtt_url(&self) -> String {
        format!("mqtt://{}:{}", self.mqtt_host, self.mqtt_port)
    }

    pub fn show_options(&self, battery: Option<u8>) -> ShowOptions {
        ShowOptions {
            transition: self.transition,
            transition_delay: self.transition_delay,
            battery,
        }
    }
}

/// MQTT client id derived from the station MAC
pub fn client_id(mac: &[u8; 6]) -> String {
    let hex: String = mac.iter().map(|b| format!("{:02x}", b)).collect();
    format!("boiler-epd-{}", hex)
}

fn non_empty(value: Option<&'static str>) -> Option<&'static str> {
    value.filter(|v| !v.is_empty())
}

fn parse_port(value: Option<&str>) -> u16 {
    match value.map(str::parse::<u16>) {
        Some(Ok(port)) => port,
        Some(Err(_)) => {
            log::warn!("Invalid MQTT_PORT, using {}", DEFAULT_MQTT_PORT);
            DEFAULT_MQTT_PORT
        }
        None => DEFAULT_MQTT_PORT,
    }
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        Some("1") | Some("true") | Some("yes") => true,
        Some("0") | Some("false") | Some("no") => false,
        _ => default,
    }
}
