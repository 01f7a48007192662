//! TelemetrySink trait - Forwarder output interface
//!
//! Defines the abstract interface for outbound sinks.

use crate::{Reading, TelemetryError};

/// Outbound delivery trait
///
/// All sink implementations must implement this trait. One call is one
/// best-effort attempt; retry policy is not a sink concern.
#[trait_variant::make(TelemetrySink: Send)]
pub trait LocalTelemetrySink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one persisted reading
    ///
    /// # Errors
    /// Returns delivery error (should include context)
    async fn deliver(&mut self, reading: &Reading) -> Result<(), TelemetryError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), TelemetryError>;
}
