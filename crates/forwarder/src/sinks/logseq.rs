//! LogseqSink - inserts one formatted text block per reading
//!
//! POSTs `logseq.Editor.insertBlock` to the Logseq HTTP API with a bearer
//! token, targeting a configured page.

use std::collections::HashMap;
use std::time::Duration;

use contracts::{Reading, TelemetryError, TelemetrySink};
use tracing::{debug, instrument};

const DEFAULT_PAGE_NAME: &str = "IoT Sensor Data";

/// Configuration for LogseqSink
#[derive(Debug, Clone)]
pub struct LogseqSinkConfig {
    /// API endpoint, e.g. http://127.0.0.1:12315/api
    pub api_url: String,
    /// Bearer token
    pub token: String,
    /// Page receiving the blocks
    pub page_name: String,
    /// Request timeout
    pub timeout: Duration,
}

impl LogseqSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>, timeout: Duration) -> Result<Self, String> {
        let api_url = params
            .get("api_url")
            .filter(|u| !u.is_empty())
            .ok_or_else(|| "missing 'api_url' parameter".to_string())?;

        let token = params
            .get("token")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "missing 'token' parameter".to_string())?;

        let page_name = params
            .get("page_name")
            .cloned()
            .unwrap_or_else(|| DEFAULT_PAGE_NAME.to_string());

        Ok(Self {
            api_url: api_url.clone(),
            token: token.clone(),
            page_name,
            timeout,
        })
    }
}

/// Sink that appends readings as blocks to a Logseq page.
pub struct LogseqSink {
    name: String,
    config: LogseqSinkConfig,
    client: reqwest::Client,
}

impl LogseqSink {
    /// Create a new LogseqSink
    pub fn new(name: impl Into<String>, config: LogseqSinkConfig) -> Result<Self, TelemetryError> {
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
        let config = LogseqSinkConfig::from_params(params, timeout)
            .map_err(|e| TelemetryError::sink_delivery(&name, e))?;
        Self::new(name, config)
    }

    fn block_content(reading: &Reading) -> String {
        let unit = reading.unit.as_deref().unwrap_or("");
        format!(
            "{} {}: {} {}",
            reading.device_id, reading.sensor_type, reading.value, unit
        )
        .trim_end()
        .to_string()
    }

    fn payload(&self, reading: &Reading) -> serde_json::Value {
        serde_json::json!({
            "method": "logseq.Editor.insertBlock",
            "args": [
                self.config.page_name,
                Self::block_content(reading),
                { "isPageBlock": true },
            ],
        })
    }
}

impl TelemetrySink for LogseqSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "logseq_sink_deliver",
        skip(self, reading),
        fields(sink = %self.name, id = reading.id)
    )]
    async fn deliver(&mut self, reading: &Reading) -> Result<(), TelemetryError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.token)
            .json(&self.payload(reading))
            .send()
            .await
            .map_err(|e| TelemetryError::sink_delivery(&self.name, e.to_string()))?;

        match response.status().as_u16() {
            200 | 201 | 202 => {
                debug!(sink = %self.name, id = reading.id, "Block inserted");
                Ok(())
            }
            status => Err(TelemetryError::sink_delivery(
                &self.name,
                format!("unexpected status {status}"),
            )),
        }
    }

    async fn close(&mut self) -> Result<(), TelemetryError> {
        Ok(())
    }
}
