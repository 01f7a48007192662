//! # Integration Tests
//!
//! End-to-end tests over the real pipeline: store, ingestion, forwarder.
//! No broker or network server required.

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod ingest_tests {
    use chrono::Utc;
    use contracts::{
        IngestResult, RawReading, Reading, ReadingFilter, ReadingInput, ReadingStore,
        RejectReason, TelemetryError,
    };
    use ingestion::IngestionPipeline;
    use std::sync::Arc;
    use store::SqliteStore;
    use tokio::sync::mpsc;

    fn raw(device: &str, sensor: &str, value: serde_json::Value) -> RawReading {
        RawReading {
            device_id: Some(device.to_string()),
            sensor_type: Some(sensor.to_string()),
            value: Some(value),
            unit: None,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_reading_without_unit_is_accepted_and_stamped() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        let pipeline = IngestionPipeline::new(store.clone(), tx);

        let before = Utc::now();
        let result = pipeline
            .ingest(raw("dev1", "temperature", serde_json::json!(21.5)))
            .await;
        let after = Utc::now();

        let reading = result.reading().expect("accepted").clone();
        assert_eq!(reading.id, 1);
        assert_eq!(reading.device_id, "dev1");
        assert_eq!(reading.value, 21.5);
        assert!(reading.unit.is_none());
        assert!(reading.timestamp >= before - chrono::Duration::milliseconds(1));
        assert!(reading.timestamp <= after);

        // Persisted, forwarded, and queryable
        assert_eq!(rx.try_recv().unwrap(), reading);
        let rows = store.query(&ReadingFilter::any(), 0, 10).await.unwrap();
        assert_eq!(rows, vec![reading]);
    }

    #[tokio::test]
    async fn test_empty_device_id_is_rejected_everywhere() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        let pipeline = IngestionPipeline::new(store.clone(), tx);

        let result = pipeline
            .ingest(raw("", "temperature", serde_json::json!(1.0)))
            .await;

        assert!(matches!(
            result,
            IngestResult::Rejected {
                reason: RejectReason::MissingDeviceId
            }
        ));
        assert_eq!(RejectReason::MissingDeviceId.to_string(), "missing device_id");
        assert!(rx.try_recv().is_err());
        assert!(store
            .query(&ReadingFilter::any(), 0, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_non_numeric_value_is_rejected_not_a_decode_error() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let (tx, _rx) = mpsc::channel(8);
        let pipeline = IngestionPipeline::new(store, tx);

        // The wire shape decodes; rejection happens in validation.
        let decoded: RawReading =
            serde_json::from_str(r#"{"device_id":"dev1","sensor_type":"temp","value":"abc"}"#)
                .unwrap();
        let result = pipeline.ingest(decoded).await;

        assert!(matches!(
            result,
            IngestResult::Rejected {
                reason: RejectReason::InvalidValue
            }
        ));
        assert_eq!(RejectReason::InvalidValue.to_string(), "invalid value");
    }

    /// Store double whose appends always fail.
    #[derive(Clone)]
    struct BrokenStore;

    impl ReadingStore for BrokenStore {
        async fn append(&self, _input: &ReadingInput) -> Result<Reading, TelemetryError> {
            Err(TelemetryError::store("disk full"))
        }

        async fn query(
            &self,
            _filter: &ReadingFilter,
            _skip: u32,
            _limit: u32,
        ) -> Result<Vec<Reading>, TelemetryError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_store_failure_reports_failed_and_skips_forwarding() {
        let (tx, mut rx) = mpsc::channel(8);
        let pipeline = IngestionPipeline::new(BrokenStore, tx);

        let result = pipeline
            .ingest(raw("dev1", "temperature", serde_json::json!(21.5)))
            .await;

        assert!(matches!(result, IngestResult::Failed { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_concurrent_ingests_get_distinct_increasing_ids() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let (tx, _rx) = mpsc::channel(8);
        let pipeline = Arc::new(IngestionPipeline::new(store.clone(), tx));

        let a = {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                pipeline
                    .ingest(raw("dev1", "temperature", serde_json::json!(1.0)))
                    .await
            })
        };
        let b = {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                pipeline
                    .ingest(raw("dev2", "humidity", serde_json::json!(2.0)))
                    .await
            })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        let mut ids = vec![
            a.reading().expect("accepted").id,
            b.reading().expect("accepted").id,
        ];
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);

        let rows = store.query(&ReadingFilter::any(), 0, 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        // Newest first
        assert!(rows[0].id > rows[1].id);
    }
}

#[cfg(test)]
mod forwarding_tests {
    use contracts::{Reading, SinkConfig, SinkKind, TelemetryError, TelemetrySink};
    use forwarder::{BoxedSink, Forwarder, WebhookSink};
    use ingestion::IngestionPipeline;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use store::SqliteStore;
    use tokio::sync::mpsc;

    struct RecordingSink {
        name: String,
        delivered: Arc<AtomicU64>,
    }

    impl TelemetrySink for RecordingSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn deliver(&mut self, _reading: &Reading) -> Result<(), TelemetryError> {
            self.delivered.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn close(&mut self) -> Result<(), TelemetryError> {
            Ok(())
        }
    }

    /// An unreachable webhook must not keep a healthy sink from delivering,
    /// and must never surface to the ingest caller.
    #[tokio::test]
    async fn test_dead_webhook_does_not_block_other_sinks_or_ingest() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let (tx, rx) = mpsc::channel(8);
        let pipeline = IngestionPipeline::new(store, tx);

        let mut params = HashMap::new();
        // Reserved TEST-NET address, nothing listens there
        params.insert("url".to_string(), "http://192.0.2.1:9/hook".to_string());
        let webhook = WebhookSink::from_params("dead_hook", &params, Duration::from_millis(200))
            .unwrap();

        let delivered = Arc::new(AtomicU64::new(0));
        let recording = RecordingSink {
            name: "recording".to_string(),
            delivered: Arc::clone(&delivered),
        };

        let sinks: Vec<BoxedSink> = vec![Box::new(webhook), Box::new(recording)];
        let forwarder = Forwarder::with_sinks(sinks, Duration::from_secs(1), rx);
        let metrics = forwarder.sink_metrics();
        let handle = forwarder.spawn();

        let raw: contracts::RawReading =
            serde_json::from_str(r#"{"device_id":"dev1","sensor_type":"temp","value":21.5}"#)
                .unwrap();
        let result = pipeline.ingest(raw).await;
        assert!(result.is_accepted());

        // Closing the queue lets the worker drain and stop.
        drop(pipeline);
        handle.await.unwrap();

        assert_eq!(delivered.load(Ordering::Relaxed), 1);
        assert_eq!(metrics[0].1.failed(), 1);
        assert_eq!(metrics[1].1.delivered(), 1);
    }

    #[tokio::test]
    async fn test_disabled_sink_is_never_attempted() {
        let (_tx, rx) = mpsc::channel::<Reading>(1);

        let configs = vec![
            SinkConfig {
                name: "log".to_string(),
                kind: SinkKind::Log,
                enabled: true,
                params: HashMap::new(),
            },
            SinkConfig {
                name: "off_hook".to_string(),
                kind: SinkKind::Webhook,
                enabled: false,
                params: HashMap::new(),
            },
        ];

        // The disabled webhook is skipped before its params are checked.
        let forwarder =
            forwarder::create_forwarder(&configs, Duration::from_secs(1), rx).unwrap();
        let metrics = forwarder.sink_metrics();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].0, "log");
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::SinkKind;

    const FULL_CONFIG: &str = r#"
        [server]
        host = "0.0.0.0"
        port = 8000

        [database]
        path = "iot_data.db"

        [mqtt]
        enabled = true
        broker_host = "localhost"
        broker_port = 1883
        topic = "iot/sensors/#"
        reconnect_delay_secs = 5

        [forwarder]
        queue_capacity = 256
        sink_timeout_secs = 5

        [[sinks]]
        name = "webhook"
        kind = "webhook"
        params = { url = "http://127.0.0.1:9000/hook" }

        [[sinks]]
        name = "logseq"
        kind = "logseq"
        enabled = false
        params = { api_url = "http://127.0.0.1:12315/api", token = "secret" }
    "#;

    #[test]
    fn test_full_config_round_trip() {
        let blueprint = ConfigLoader::load_from_str(FULL_CONFIG, ConfigFormat::Toml).unwrap();
        assert_eq!(blueprint.server.port, 8000);
        assert_eq!(blueprint.mqtt.topic, "iot/sensors/#");
        assert_eq!(blueprint.sinks.len(), 2);
        assert_eq!(blueprint.sinks[0].kind, SinkKind::Webhook);
        assert!(blueprint.sinks[0].enabled);
        assert!(!blueprint.sinks[1].enabled);
    }

    #[test]
    fn test_duplicate_sink_names_rejected() {
        let config = r#"
            [[sinks]]
            name = "hook"
            kind = "webhook"
            params = { url = "http://a" }

            [[sinks]]
            name = "hook"
            kind = "log"
        "#;
        assert!(ConfigLoader::load_from_str(config, ConfigFormat::Toml).is_err());
    }

    #[test]
    fn test_logseq_without_token_rejected() {
        let config = r#"
            [[sinks]]
            name = "notes"
            kind = "logseq"
            params = { api_url = "http://127.0.0.1:12315/api" }
        "#;
        assert!(ConfigLoader::load_from_str(config, ConfigFormat::Toml).is_err());
    }
}
