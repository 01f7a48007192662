//! ReadingStore trait - durable append-and-query log
//!
//! Defines the abstract interface the ingestion pipeline persists through.

use crate::{Reading, ReadingInput, TelemetryError};

/// Exact-match query filters, AND-combined when both are given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingFilter {
    pub device_id: Option<String>,
    pub sensor_type: Option<String>,
}

impl ReadingFilter {
    /// Filter matching every reading
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict to one device
    pub fn device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Restrict to one sensor type
    pub fn sensor(mut self, sensor_type: impl Into<String>) -> Self {
        self.sensor_type = Some(sensor_type.into());
        self
    }
}

/// Durable reading log
///
/// Must be safe for concurrent `append`/`query` from multiple callers;
/// readings are independent and the log is append-only.
#[trait_variant::make(ReadingStore: Send)]
pub trait LocalReadingStore {
    /// Persist one reading, assigning `id` and stamping `timestamp`
    /// when the input carries none.
    ///
    /// # Errors
    /// Any persistence-layer failure; the caller must not forward on this path.
    async fn append(&self, input: &ReadingInput) -> Result<Reading, TelemetryError>;

    /// Readings matching `filter`, ordered by timestamp descending,
    /// with `skip`/`limit` applied after ordering.
    ///
    /// Nothing matching is an empty vec, never an error.
    async fn query(
        &self,
        filter: &ReadingFilter,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Reading>, TelemetryError>;
}
