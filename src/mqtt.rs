use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result};
use embedded_svc::mqtt::client::QoS;
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};
use log::{info, warn};

use boiler_epaper::config::Config;

/// What the MQTT task hands over to the main loop
#[derive(Debug)]
pub enum Message {
    Connected,
    Disconnected,
    Payload(Vec<u8>),
}

/// Broker connection with incoming messages queued for the main task
pub struct MqttLink {
    client: EspMqttClient<'static>,
    messages: Receiver<Message>,
    topic: &'static str,
}

impl MqttLink {
    /// Start the client, the broker connection is made in the background
    pub fn start(config: &Config, client_id: &str) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        let topic = config.topic;

        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            username: config.mqtt_user,
            password: config.mqtt_pass,
            keep_alive_interval: Some(Duration::from_secs(30)),
            reconnect_timeout: Some(Duration::from_secs(2)),
            ..Default::default()
        };

        let url = config.mqtt_url();
        info!("MQTT connect {} as {}", url, client_id);

        let client = EspMqttClient::new_cb(&url, &conf, move |event| {
            let message = match event.payload() {
                EventPayload::Connected(_) => Message::Connected,
                EventPayload::Disconnected => Message::Disconnected,
                EventPayload::Received {
                    topic: Some(received),
                    data,
                    ..
                } if received == topic => Message::Payload(data.to_vec()),
                EventPayload::Error(e) => {
                    warn!("MQTT error: {:?}", e);
                    return;
                }
                _ => return,
            };
            // Main task gone means we are about to sleep
            let _ = tx.send(message);
        })
        .context("Could not start MQTT client")?;

        Ok(MqttLink {
            client,
            messages: rx,
            topic,
        })
    }

    /// Subscribe to the temperature topic, needed again after every reconnect
    pub fn subscribe(&mut self) -> Result<()> {
        self.client
            .subscribe(self.topic, QoS::AtLeastOnce)
            .with_context(|| format!("Subscribe to {} failed", self.topic))?;
        info!("MQTT subscribed: {}", self.topic);
        Ok(())
    }

    /// Next message, `None` once `timeout` passes without one
    pub fn next(&self, timeout: Option<Duration>) -> Result<Option<Message>> {
        let received = match timeout {
            Some(timeout) => self.messages.recv_timeout(timeout),
            None => self
                .messages
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(message) => Ok(Some(message)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => anyhow::bail!("MQTT client stopped"),
        }
    }
}
