//! Ingest metric recording
//!
//! Adapters call [`record_ingest`] after every pipeline call so counters
//! carry the inbound channel as a label. The forwarder emits its own
//! per-sink delivery counters.

use contracts::{IngestResult, RejectReason};
use metrics::{counter, histogram};

/// Record the outcome of one ingest call.
pub fn record_ingest(channel: &str, result: &IngestResult) {
    match result {
        IngestResult::Accepted(_) => {
            counter!(
                "iot_hub_readings_ingested_total",
                "channel" => channel.to_string()
            )
            .increment(1);
        }
        IngestResult::Rejected { reason } => {
            counter!(
                "iot_hub_readings_rejected_total",
                "channel" => channel.to_string(),
                "reason" => reason_label(*reason)
            )
            .increment(1);
        }
        IngestResult::Failed { .. } => {
            counter!(
                "iot_hub_store_failures_total",
                "channel" => channel.to_string()
            )
            .increment(1);
        }
    }
}

/// Record end-to-end ingest latency (decode to persisted).
pub fn record_ingest_latency_ms(latency_ms: f64) {
    histogram!("iot_hub_ingest_latency_ms").record(latency_ms);
}

fn reason_label(reason: RejectReason) -> &'static str {
    match reason {
        RejectReason::MissingDeviceId => "missing_device_id",
        RejectReason::MissingSensorType => "missing_sensor_type",
        RejectReason::MissingValue => "missing_value",
        RejectReason::InvalidValue => "invalid_value",
    }
}
