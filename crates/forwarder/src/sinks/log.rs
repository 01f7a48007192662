//! LogSink - logs a reading summary via tracing

use contracts::{Reading, TelemetryError, TelemetrySink};
use tracing::{info, instrument};

/// Sink that logs reading summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TelemetrySink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_deliver",
        skip(self, reading),
        fields(sink = %self.name, id = reading.id)
    )]
    async fn deliver(&mut self, reading: &Reading) -> Result<(), TelemetryError> {
        info!(
            sink = %self.name,
            id = reading.id,
            device_id = %reading.device_id,
            sensor_type = %reading.sensor_type,
            value = reading.value,
            unit = reading.unit.as_deref().unwrap_or(""),
            timestamp = %reading.timestamp,
            "Reading forwarded"
        );
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TelemetryError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
