//! WebhookSink - HTTP POST of each reading to a configured URL

use std::collections::HashMap;
use std::time::Duration;

use contracts::{Reading, TelemetryError, TelemetrySink};
use tracing::{debug, instrument};

/// Configuration for WebhookSink
#[derive(Debug, Clone)]
pub struct WebhookSinkConfig {
    /// Target URL
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl WebhookSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>, timeout: Duration) -> Result<Self, String> {
        let url = params
            .get("url")
            .filter(|u| !u.is_empty())
            .ok_or_else(|| "missing 'url' parameter".to_string())?;

        Ok(Self {
            url: url.clone(),
            timeout,
        })
    }
}

/// Sink that POSTs readings as JSON to a webhook URL.
///
/// Success is any of status 200, 201, 202.
pub struct WebhookSink {
    name: String,
    config: WebhookSinkConfig,
    client: reqwest::Client,
}

impl WebhookSink {
    /// Create a new WebhookSink
    pub fn new(name: impl Into<String>, config: WebhookSinkConfig) -> Result<Self, TelemetryError> {
        let name = name.into();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TelemetryError::sink_delivery(&name, e.to_string()))?;

        Ok(Self {
            name,
            config,
            client,
        })
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, TelemetryError> {
        let name = name.into();
        let config = WebhookSinkConfig::from_params(params, timeout)
            .map_err(|e| TelemetryError::sink_delivery(&name, e))?;
        Self::new(name, config)
    }

    fn payload(reading: &Reading) -> serde_json::Value {
        serde_json::json!({
            "device_id": reading.device_id,
            "sensor_type": reading.sensor_type,
            "value": reading.value,
            "unit": reading.unit,
            "timestamp": reading.timestamp,
        })
    }
}

impl TelemetrySink for WebhookSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "webhook_sink_deliver",
        skip(self, reading),
        fields(sink = %self.name, id = reading.id)
    )]
    async fn deliver(&mut self, reading: &Reading) -> Result<(), TelemetryError> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&Self::payload(reading))
            .send()
            .await
            .map_err(|e| TelemetryError::sink_delivery(&self.name, e.to_string()))?;

        match response.status().as_u16() {
            200 | 201 | 202 => {
                debug!(sink = %self.name, id = reading.id, "Forwarded to webhook");
                Ok(())
            }
            status => Err(TelemetryError::sink_delivery(
                &self.name,
                format!("unexpected status {status}"),
            )),
        }
    }

    async fn close(&mut self) -> Result<(), TelemetryError> {
        // HTTP client is stateless, nothing to release
        Ok(())
    }
}
