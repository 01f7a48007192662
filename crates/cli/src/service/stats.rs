//! Service run statistics.

use std::time::Duration;

use forwarder::SinkSnapshot;
use ingestion::IngestSnapshot;

/// Statistics from a service run
#[derive(Debug, Clone, Default)]
pub struct ServiceStats {
    /// Total duration of the run
    pub duration: Duration,

    /// Total raw readings received across all channels
    pub received: u64,

    /// Total readings durably appended
    pub accepted: u64,

    /// Total readings failing validation
    pub rejected: u64,

    /// Total persistence failures
    pub store_failures: u64,

    /// Accepted readings dropped at the forward queue
    pub forward_dropped: u64,

    /// Number of sinks that were active
    pub active_sinks: usize,

    /// Per-sink delivery counts
    pub sink_stats: Vec<(String, SinkSnapshot)>,
}

impl ServiceStats {
    pub fn new(
        duration: Duration,
        snapshot: IngestSnapshot,
        active_sinks: usize,
        sink_stats: Vec<(String, SinkSnapshot)>,
    ) -> Self {
        Self {
            duration,
            received: snapshot.received,
            accepted: snapshot.accepted,
            rejected: snapshot.rejected,
            store_failures: snapshot.store_failures,
            forward_dropped: snapshot.forward_dropped,
            active_sinks,
            sink_stats,
        }
    }

    /// Readings ingested per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.accepted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of received readings that were accepted, as a percentage
    pub fn accept_rate(&self) -> f64 {
        if self.received > 0 {
            (self.accepted as f64 / self.received as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Service Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Ingestion");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Readings received: {}", self.received);
        println!(
            "   ├─ Accepted: {} ({:.2}%)",
            self.accepted,
            self.accept_rate()
        );
        println!("   ├─ Rejected: {}", self.rejected);
        println!("   ├─ Store failures: {}", self.store_failures);
        println!("   ├─ Forward queue drops: {}", self.forward_dropped);
        println!("   └─ Throughput: {:.2} readings/s", self.throughput());

        if !self.sink_stats.is_empty() {
            println!("\n📤 Sinks ({})", self.active_sinks);
            for (i, (name, snapshot)) in self.sink_stats.iter().enumerate() {
                let is_last = i == self.sink_stats.len() - 1;
                let prefix = if is_last { "└─" } else { "├─" };
                println!(
                    "   {} {}: {} delivered, {} failed",
                    prefix, name, snapshot.delivered, snapshot.failed
                );
            }
        }

        println!();
    }
}
