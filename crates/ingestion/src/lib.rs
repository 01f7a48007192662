//! # Ingestion
//!
//! The single normalized path every reading passes through, regardless of
//! which inbound channel produced it.
//!
//! Responsibilities:
//! - Centralized field validation (adapters never re-implement checks)
//! - Durable append via the reading store
//! - Detached hand-off of accepted readings to the forwarder queue

mod metrics;
mod pipeline;
mod validate;

pub use contracts::{IngestResult, RawReading, Reading, ReadingInput, RejectReason};
pub use metrics::{IngestMetrics, IngestSnapshot};
pub use pipeline::IngestionPipeline;
pub use validate::validate;
