//! Sink implementations
//!
//! Contains WebhookSink, LogseqSink, and LogSink, plus the object-safe
//! adapter that lets one worker drive a heterogeneous sink set.

mod log;
mod logseq;
mod webhook;

pub use self::log::LogSink;
pub use self::logseq::LogseqSink;
pub use self::webhook::WebhookSink;

use std::future::Future;
use std::pin::Pin;

use contracts::{Reading, TelemetryError, TelemetrySink};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe view of [`TelemetrySink`] so heterogeneous sinks can share
/// one worker task.
pub trait ErasedSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one persisted reading
    fn deliver<'a>(&'a mut self, reading: &'a Reading)
        -> BoxFuture<'a, Result<(), TelemetryError>>;

    /// Close sink
    fn close(&mut self) -> BoxFuture<'_, Result<(), TelemetryError>>;
}

impl<S: TelemetrySink + Send> ErasedSink for S {
    fn name(&self) -> &str {
        TelemetrySink::name(self)
    }

    fn deliver<'a>(
        &'a mut self,
        reading: &'a Reading,
    ) -> BoxFuture<'a, Result<(), TelemetryError>> {
        Box::pin(TelemetrySink::deliver(self, reading))
    }

    fn close(&mut self) -> BoxFuture<'_, Result<(), TelemetryError>> {
        Box::pin(TelemetrySink::close(self))
    }
}

/// A boxed sink ready for the forwarder worker
pub type BoxedSink = Box<dyn ErasedSink>;
