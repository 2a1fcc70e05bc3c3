use anyhow::{bail, Context, Result};
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{info, warn};

/// Attempts before giving up on the access point
const CONNECT_ATTEMPTS: u32 = 10;

/// Pause between attempts
const RETRY_DELAY_MS: u32 = 500;

#[derive(Debug)]
pub struct WifiNetwork<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
    pub auth_method: AuthMethod,
}

impl<'a> WifiNetwork<'a> {
    /// Open network when the password is empty, WPA2 otherwise
    pub fn new(ssid: &'a str, password: &'a str) -> Self {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        Self {
            ssid,
            password,
            auth_method,
        }
    }

    fn client_configuration(&self) -> Result<Configuration> {
        Ok(Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .try_into()
                .map_err(|_| anyhow::anyhow!("SSID {:?} is too long", self.ssid))?,
            password: self
                .password
                .try_into()
                .map_err(|_| anyhow::anyhow!("WiFi password is too long"))?,
            auth_method: self.auth_method,
            ..Default::default()
        }))
    }
}

/// Station mode connection that stays up for the lifetime of the firmware
pub struct WifiStation {
    wifi: Box<BlockingWifi<EspWifi<'static>>>,
}

impl WifiStation {
    pub fn connect(modem: Modem, network: &WifiNetwork<'_>) -> Result<Self> {
        let sys_loop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        let mut wifi = Box::new(BlockingWifi::wrap(
            EspWifi::new(modem, sys_loop.clone(), Some(nvs))?,
            sys_loop,
        )?);

        wifi.set_configuration(&network.client_configuration()?)?;
        wifi.start()?;
        info!("Connecting to {}", network.ssid);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match wifi.connect().and_then(|_| wifi.wait_netif_up()) {
                Ok(()) => break,
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    warn!("WiFi attempt {} failed: {}", attempt, e);
                    FreeRtos::delay_ms(RETRY_DELAY_MS);
                }
                Err(e) => bail!("WiFi connection to {} failed: {}", network.ssid, e),
            }
        }

        let station = WifiStation { wifi };
        info!("WiFi OK, IP: {}", station.ip_info()?.ip);
        Ok(station)
    }

    pub fn ip_info(&self) -> Result<esp_idf_svc::ipv4::IpInfo> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .context("Could not read station IP")
    }

    /// Station MAC, used for the MQTT client id
    pub fn mac(&self) -> Result<[u8; 6]> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_mac()
            .context("Could not read station MAC")
    }

    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}
