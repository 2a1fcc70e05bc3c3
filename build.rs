use std::env;

/// Build-time configuration picked up by `src/config.rs` through `option_env!`
const CONFIG_VARS: &[&str] = &[
    "WIFI_SSID",
    "WIFI_PASS",
    "MQTT_HOST",
    "MQTT_PORT",
    "MQTT_USER",
    "MQTT_PASS",
    "MQTT_TOPIC",
    "DEEP_SLEEP",
    "BATTERY",
];

/// Without these the firmware cannot reach the broker at all
const REQUIRED_VARS: &[&str] = &["WIFI_SSID", "MQTT_HOST"];

fn main() {
    // Only the ESP-IDF build carries the esp-idf-sys link arguments
    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();

        for var in REQUIRED_VARS {
            if env::var(var).map(|v| v.is_empty()).unwrap_or(true) {
                println!(
                    "cargo:warning={} is not set, the firmware will refuse to start",
                    var
                );
            }
        }
    }

    for var in CONFIG_VARS {
        println!("cargo:rerun-if-env-changed={}", var);
    }
}
