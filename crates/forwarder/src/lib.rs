//! # Forwarder
//!
//! Best-effort fan-out of persisted readings.
//!
//! Responsibilities:
//! - Consume accepted `Reading`s off the hand-off queue
//! - Deliver to each enabled sink, one bounded attempt per sink
//! - Isolate failures: a dead sink never blocks another sink, the pipeline,
//!   or the original caller

pub mod error;
pub mod forwarder;
pub mod metrics;
pub mod sinks;

pub use contracts::{Reading, TelemetrySink};
pub use error::ForwarderError;
pub use forwarder::{create_forwarder, Forwarder};
pub use metrics::{SinkMetrics, SinkSnapshot};
pub use sinks::{BoxedSink, ErasedSink, LogSink, LogseqSink, WebhookSink};
