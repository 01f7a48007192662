//! Ingestion Pipeline main entry

use std::sync::Arc;

use contracts::{IngestResult, RawReading, Reading, ReadingStore};
use tokio::sync::mpsc;
use tracing::{debug, error, instrument, warn};

use crate::metrics::IngestMetrics;
use crate::validate::validate;

/// Ingestion Pipeline
///
/// Shared by all inbound adapters; invoked concurrently with no
/// serialization between producers. Holds the store and the sending half of
/// the forwarder queue. Dropping the last pipeline clone closes the queue,
/// letting the forwarder drain and stop.
pub struct IngestionPipeline<S> {
    store: S,
    forward_tx: mpsc::Sender<Reading>,
    metrics: Arc<IngestMetrics>,
}

impl<S> IngestionPipeline<S>
where
    S: ReadingStore + Send + Sync,
{
    /// Create a pipeline over `store`, forwarding accepted readings into
    /// `forward_tx`.
    pub fn new(store: S, forward_tx: mpsc::Sender<Reading>) -> Self {
        Self {
            store,
            forward_tx,
            metrics: Arc::new(IngestMetrics::new()),
        }
    }

    /// Ingest one raw reading: validate, persist, hand off for forwarding.
    ///
    /// `Accepted` is returned as soon as persistence succeeds; forwarding
    /// runs detached and never changes the result. Rejected or failed
    /// readings never reach the forwarder queue.
    #[instrument(name = "pipeline_ingest", skip(self, raw))]
    pub async fn ingest(&self, raw: RawReading) -> IngestResult {
        self.metrics.record_received();

        let input = match validate(raw) {
            Ok(input) => input,
            Err(reason) => {
                self.metrics.record_rejected();
                debug!(%reason, "Reading rejected");
                return IngestResult::Rejected { reason };
            }
        };

        let reading = match self.store.append(&input).await {
            Ok(reading) => reading,
            Err(error) => {
                self.metrics.record_store_failure();
                error!(error = %error, "Append failed, forwarding skipped");
                return IngestResult::Failed { error };
            }
        };

        self.forward(&reading);
        self.metrics.record_accepted();
        IngestResult::Accepted(reading)
    }

    /// Hand an accepted reading to the forwarder queue (non-blocking).
    fn forward(&self, reading: &Reading) {
        match self.forward_tx.try_send(reading.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.record_forward_dropped();
                ::metrics::counter!("iot_hub_forward_queue_dropped_total").increment(1);
                warn!(id = reading.id, "Forward queue full, reading not forwarded");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(id = reading.id, "Forwarder stopped, reading not forwarded");
            }
        }
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestMetrics> {
        self.metrics.clone()
    }
}
