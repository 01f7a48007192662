//! MQTT subscriber
//!
//! Subscribes to the configured topic pattern and feeds every publish into
//! the ingestion pipeline. MQTT carries no reply channel, so rejected
//! payloads are logged and dropped.
//!
//! The subscription is re-issued on every ConnAck so it survives broker
//! restarts; connection errors pace reconnect attempts with a fixed delay.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use contracts::{IngestResult, MqttConfig, RawReading, ReadingStore};
use ingestion::IngestionPipeline;

const CLIENT_ID: &str = "iot-hub-subscriber";

/// MQTT inbound adapter.
pub struct MqttSubscriber<S> {
    config: MqttConfig,
    pipeline: Arc<IngestionPipeline<S>>,
}

impl<S> MqttSubscriber<S>
where
    S: ReadingStore + Send + Sync,
{
    pub fn new(config: MqttConfig, pipeline: Arc<IngestionPipeline<S>>) -> Self {
        Self { config, pipeline }
    }

    /// Run the subscriber loop. Never returns; the caller aborts the task
    /// at shutdown.
    #[instrument(
        name = "mqtt_run",
        skip(self),
        fields(broker = %self.config.broker_host, topic = %self.config.topic)
    )]
    pub async fn run(self) {
        let mut options = MqttOptions::new(
            CLIENT_ID,
            &self.config.broker_host,
            self.config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(30));
        if let Some((username, password)) = credentials(&self.config) {
            options.set_credentials(username, password);
        }

        let (client, mut eventloop) = AsyncClient::new(options, 16);
        let reconnect_delay = Duration::from_secs(self.config.reconnect_delay_secs);

        info!("MQTT subscriber started");

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!(topic = %self.config.topic, "Connected to broker, subscribing");
                    if let Err(e) = client.subscribe(&self.config.topic, QoS::AtMostOnce).await {
                        error!(error = %e, "Subscribe failed");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.handle_message(&publish.topic, &publish.payload).await;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, delay_secs = self.config.reconnect_delay_secs,
                        "Broker connection lost, reconnecting");
                    sleep(reconnect_delay).await;
                }
            }
        }
    }

    /// Ingest one publish. The receipt time becomes the reading timestamp,
    /// overriding anything the payload asserts.
    async fn handle_message(&self, topic: &str, payload: &[u8]) {
        let mut raw: RawReading = match serde_json::from_slice(payload) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(topic, error = %e, "Dropping non-JSON MQTT payload");
                return;
            }
        };
        raw.timestamp = Some(Utc::now());

        let started = std::time::Instant::now();
        let result = self.pipeline.ingest(raw).await;
        observability::record_ingest("mqtt", &result);
        observability::record_ingest_latency_ms(started.elapsed().as_secs_f64() * 1000.0);

        match result {
            IngestResult::Accepted(reading) => {
                debug!(topic, id = reading.id, "MQTT reading accepted");
            }
            IngestResult::Rejected { reason } => {
                warn!(topic, %reason, "Dropping rejected MQTT payload");
            }
            IngestResult::Failed { error } => {
                error!(topic, error = %error, "MQTT reading lost to store failure");
            }
        }
    }
}

/// Broker credentials from config. Empty strings count as unset, so a
/// config carrying the documented `username = ""` placeholder connects
/// anonymously.
fn credentials(config: &MqttConfig) -> Option<(&str, &str)> {
    match (config.username.as_deref(), config.password.as_deref()) {
        (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
        _ => None,
    }
}
