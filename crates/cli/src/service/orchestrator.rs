//! Service orchestrator - wires store, pipeline, forwarder, and adapters.
//!
//! Startup order: store, forwarder worker, pipeline, HTTP/WS server, MQTT
//! subscriber. Shutdown reverses it: the server drains on signal, the MQTT
//! task is aborted, then dropping the pipeline closes the forward queue so
//! the forwarder can drain before the process exits.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use adapters::{AppState, MqttSubscriber};
use contracts::{Reading, ServiceBlueprint};
use forwarder::create_forwarder;
use ingestion::IngestionPipeline;
use store::SqliteStore;

use super::ServiceStats;

/// How long to wait for the forwarder to drain at shutdown
const FORWARDER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// The service blueprint configuration
    pub blueprint: ServiceBlueprint,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main service orchestrator
pub struct Service {
    config: ServiceConfig,
}

impl Service {
    /// Create a new service with the given configuration
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Run the service until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<ServiceStats>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Open the store
        info!(path = %blueprint.database.path, "Opening reading store");
        let store = SqliteStore::open(std::path::Path::new(&blueprint.database.path))
            .await
            .with_context(|| format!("Failed to open database at {}", blueprint.database.path))?;

        // Start the forwarder worker
        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - accepted readings will not be forwarded");
        }

        let (forward_tx, forward_rx) =
            mpsc::channel::<Reading>(blueprint.forwarder.queue_capacity);
        let sink_timeout = Duration::from_secs(blueprint.forwarder.sink_timeout_secs);

        let forwarder = create_forwarder(&blueprint.sinks, sink_timeout, forward_rx)
            .context("Failed to create forwarder")?;
        let sink_metrics = forwarder.sink_metrics();
        let active_sinks = sink_metrics.len();
        let forwarder_handle = forwarder.spawn();

        info!(active_sinks, "Forwarder started");

        // Wire the ingestion pipeline and inbound adapters
        let pipeline = Arc::new(IngestionPipeline::new(store.clone(), forward_tx));
        let ingest_metrics = pipeline.metrics();

        let mqtt_handle = if blueprint.mqtt.enabled {
            let subscriber = MqttSubscriber::new(blueprint.mqtt.clone(), Arc::clone(&pipeline));
            Some(tokio::spawn(subscriber.run()))
        } else {
            info!("MQTT subscriber disabled");
            None
        };

        let state = AppState::new(Arc::clone(&pipeline), store);
        let router = adapters::router(state);

        let addr = format!("{}:{}", blueprint.server.host, blueprint.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind HTTP server at {addr}"))?;

        info!(addr = %addr, "HTTP server listening");

        // Serve until the shutdown future resolves
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server failed")?;

        // Shutdown: stop MQTT, then close the forward queue and drain
        info!("Shutting down service...");
        if let Some(handle) = mqtt_handle {
            handle.abort();
            let _ = handle.await;
        }
        drop(pipeline);

        if tokio::time::timeout(FORWARDER_DRAIN_TIMEOUT, forwarder_handle)
            .await
            .is_err()
        {
            warn!(
                timeout_secs = FORWARDER_DRAIN_TIMEOUT.as_secs(),
                "Forwarder did not drain in time"
            );
        }

        let stats = ServiceStats::new(
            start_time.elapsed(),
            ingest_metrics.snapshot(),
            active_sinks,
            sink_metrics
                .iter()
                .map(|(name, metrics)| (name.clone(), metrics.snapshot()))
                .collect(),
        );

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            "Service shutdown complete"
        );

        Ok(stats)
    }
}
