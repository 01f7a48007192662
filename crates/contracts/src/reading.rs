//! Reading - the sole persisted entity
//!
//! Wire shape, validated pipeline input, and fully populated row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TelemetryError;

/// Raw reading as decoded from any inbound channel.
///
/// Every field is optional: adapters never reject on missing fields,
/// the ingestion pipeline owns all field checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawReading {
    /// Device identifier (opaque)
    #[serde(default)]
    pub device_id: Option<String>,

    /// Sensor type (opaque)
    #[serde(default)]
    pub sensor_type: Option<String>,

    /// Measured value, kept raw until validated
    #[serde(default)]
    pub value: Option<serde_json::Value>,

    /// Optional measurement unit
    #[serde(default)]
    pub unit: Option<String>,

    /// Receipt time asserted by the channel (MQTT adapter only)
    #[serde(skip)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Validated pipeline input, ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingInput {
    pub device_id: String,
    pub sensor_type: String,
    pub value: f64,
    pub unit: Option<String>,

    /// When `None`, the store stamps the append time.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Fully populated reading as persisted.
///
/// Immutable once created; the log is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Store-assigned, monotonically increasing, never reused
    pub id: i64,

    pub device_id: String,
    pub sensor_type: String,
    pub value: f64,
    pub unit: Option<String>,

    /// Time of ingestion (UTC)
    pub timestamp: DateTime<Utc>,
}

/// Why a raw reading was rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("missing device_id")]
    MissingDeviceId,

    #[error("missing sensor_type")]
    MissingSensorType,

    #[error("missing value")]
    MissingValue,

    #[error("invalid value")]
    InvalidValue,
}

/// Outcome of one `ingest` call.
#[derive(Debug)]
pub enum IngestResult {
    /// Persisted; forwarding runs detached from this result
    Accepted(Reading),

    /// Failed validation; neither store nor forwarder were touched
    Rejected { reason: RejectReason },

    /// Persistence failed; forwarding was skipped
    Failed { error: TelemetryError },
}

impl IngestResult {
    /// True when the reading was durably appended.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// The persisted reading, when accepted.
    pub fn reading(&self) -> Option<&Reading> {
        match self {
            Self::Accepted(reading) => Some(reading),
            _ => None,
        }
    }
}
