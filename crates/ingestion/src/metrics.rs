//! Ingest metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Pipeline counters
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Total raw readings received
    pub received: AtomicU64,

    /// Total readings durably appended
    pub accepted: AtomicU64,

    /// Total readings failing validation
    pub rejected: AtomicU64,

    /// Total persistence failures
    pub store_failures: AtomicU64,

    /// Accepted readings dropped at the forward queue
    pub forward_dropped: AtomicU64,
}

impl IngestMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record raw reading received
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record reading accepted
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record validation rejection
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record persistence failure
    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a forward hand-off that could not be queued
    pub fn record_forward_dropped(&self) {
        self.forward_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            received: self.received.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            forward_dropped: self.forward_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot (for reporting)
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestSnapshot {
    pub received: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub store_failures: u64,
    pub forward_dropped: u64,
}
