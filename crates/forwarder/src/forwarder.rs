//! Forwarder - worker loop for fan-out to sinks
//!
//! One worker consumes the hand-off queue; per reading, enabled sinks are
//! attempted strictly in config order, each under its own bounded timeout.
//! Total wall time per reading is bounded by sinks × timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument};

use contracts::{Reading, SinkConfig, SinkKind};

use crate::error::ForwarderError;
use crate::metrics::SinkMetrics;
use crate::sinks::{BoxedSink, LogSink, LogseqSink, WebhookSink};

struct SinkSlot {
    sink: BoxedSink,
    metrics: Arc<SinkMetrics>,
}

/// The forwarder worker that fans out readings to sinks
pub struct Forwarder {
    slots: Vec<SinkSlot>,
    sink_timeout: Duration,
    input_rx: mpsc::Receiver<Reading>,
}

impl Forwarder {
    /// Build a forwarder from sink configurations.
    ///
    /// Disabled sinks are skipped; a misconfigured enabled sink is a
    /// startup error, not a runtime one.
    #[instrument(
        name = "forwarder_build",
        skip(configs, input_rx),
        fields(sink_count = configs.len())
    )]
    pub fn from_configs(
        configs: &[SinkConfig],
        sink_timeout: Duration,
        input_rx: mpsc::Receiver<Reading>,
    ) -> Result<Self, ForwarderError> {
        let mut sinks = Vec::with_capacity(configs.len());
        for config in configs {
            if !config.enabled {
                debug!(sink = %config.name, "Sink disabled, skipping");
                continue;
            }
            sinks.push(create_sink(config, sink_timeout)?);
        }
        Ok(Self::with_sinks(sinks, sink_timeout, input_rx))
    }

    /// Create a forwarder with pre-built sinks (for testing)
    pub fn with_sinks(
        sinks: Vec<BoxedSink>,
        sink_timeout: Duration,
        input_rx: mpsc::Receiver<Reading>,
    ) -> Self {
        let slots = sinks
            .into_iter()
            .map(|sink| SinkSlot {
                sink,
                metrics: Arc::new(SinkMetrics::new()),
            })
            .collect();

        Self {
            slots,
            sink_timeout,
            input_rx,
        }
    }

    /// Per-sink metric handles, readable after the worker is spawned
    pub fn sink_metrics(&self) -> Vec<(String, Arc<SinkMetrics>)> {
        self.slots
            .iter()
            .map(|s| (s.sink.name().to_string(), Arc::clone(&s.metrics)))
            .collect()
    }

    /// Run the forwarder main loop
    ///
    /// Consumes readings from the queue and fans out to all sinks.
    /// Returns when the queue is closed and drained.
    #[instrument(name = "forwarder_run", skip(self))]
    pub async fn run(mut self) {
        info!(sinks = self.slots.len(), "Forwarder started");

        let mut reading_count: u64 = 0;

        while let Some(reading) = self.input_rx.recv().await {
            reading_count += 1;
            self.dispatch(&reading).await;

            if reading_count % 100 == 0 {
                debug!(readings = reading_count, "Forwarder progress");
            }
        }

        info!(
            readings = reading_count,
            "Forward queue closed, shutting down"
        );

        Self::close_slots(self.slots).await;

        info!("Forwarder shutdown complete");
    }

    /// Spawn the forwarder as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// One best-effort attempt per enabled sink, sequentially.
    ///
    /// A failed or timed-out sink never cancels the remaining attempts.
    async fn dispatch(&mut self, reading: &Reading) {
        for slot in &mut self.slots {
            match timeout(self.sink_timeout, slot.sink.deliver(reading)).await {
                Ok(Ok(())) => {
                    slot.metrics.inc_delivered();
                    record_delivery(slot.sink.name(), true);
                }
                Ok(Err(e)) => {
                    slot.metrics.inc_failed();
                    record_delivery(slot.sink.name(), false);
                    error!(
                        sink = %slot.sink.name(),
                        id = reading.id,
                        error = %e,
                        "Delivery failed"
                    );
                }
                Err(_) => {
                    slot.metrics.inc_failed();
                    record_delivery(slot.sink.name(), false);
                    error!(
                        sink = %slot.sink.name(),
                        id = reading.id,
                        timeout_ms = self.sink_timeout.as_millis() as u64,
                        "Delivery timed out"
                    );
                }
            }
        }
    }

    async fn close_slots(slots: Vec<SinkSlot>) {
        for mut slot in slots {
            if let Err(e) = slot.sink.close().await {
                error!(sink = %slot.sink.name(), error = %e, "Close failed on shutdown");
            }
        }
    }
}

fn record_delivery(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    ::metrics::counter!(
        "iot_hub_sink_deliveries_total",
        "sink" => sink_name.to_string(),
        "status" => status,
    )
    .increment(1);
}

/// Create a boxed sink from configuration
fn create_sink(config: &SinkConfig, sink_timeout: Duration) -> Result<BoxedSink, ForwarderError> {
    match config.kind {
        SinkKind::Webhook => {
            let sink = WebhookSink::from_params(&config.name, &config.params, sink_timeout)
                .map_err(|e| ForwarderError::sink_creation(&config.name, e.to_string()))?;
            Ok(Box::new(sink))
        }
        SinkKind::Logseq => {
            let sink = LogseqSink::from_params(&config.name, &config.params, sink_timeout)
                .map_err(|e| ForwarderError::sink_creation(&config.name, e.to_string()))?;
            Ok(Box::new(sink))
        }
        SinkKind::Log => Ok(Box::new(LogSink::new(&config.name))),
    }
}

/// Convenience function to create a forwarder from sink configs
#[instrument(name = "forwarder_create", skip(sink_configs, input_rx))]
pub fn create_forwarder(
    sink_configs: &[SinkConfig],
    sink_timeout: Duration,
    input_rx: mpsc::Receiver<Reading>,
) -> Result<Forwarder, ForwarderError> {
    Forwarder::from_configs(sink_configs, sink_timeout, input_rx)
}
