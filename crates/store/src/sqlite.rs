//! SqliteStore - append-only reading log on SQLite
//!
//! All SQL runs on the dedicated executor thread owned by
//! `tokio_rusqlite::Connection`; callers await results without blocking the
//! runtime. WAL mode allows concurrent readers while SQLite serializes
//! writes, which is all the isolation an append-only log needs.

use std::path::Path;

use chrono::{DateTime, Utc};
use contracts::{Reading, ReadingFilter, ReadingInput, ReadingStore, TelemetryError};
use tokio_rusqlite::Connection;
use tracing::{debug, info, instrument};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    device_id TEXT NOT NULL,
    sensor_type TEXT NOT NULL,
    value REAL NOT NULL,
    timestamp_ms INTEGER NOT NULL,
    unit TEXT
);
CREATE INDEX IF NOT EXISTS idx_readings_device_id ON readings(device_id);
CREATE INDEX IF NOT EXISTS idx_readings_sensor_type ON readings(sensor_type);
";

/// Convert a tokio_rusqlite::Error into the store error kind.
fn from_tokio_rusqlite(e: tokio_rusqlite::Error) -> TelemetryError {
    TelemetryError::store(e.to_string())
}

/// SQLite-backed reading store.
///
/// Cheap to clone; all clones share the same executor thread.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, apply pragmas and schema.
    #[instrument(name = "store_open", skip(path))]
    pub async fn open(path: &Path) -> Result<Self, TelemetryError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(from_tokio_rusqlite)?;

        let store = Self { conn };
        store.initialize().await?;

        info!(path = %path.display(), "Reading store opened");
        Ok(store)
    }

    /// Open an in-memory database (tests and dry runs).
    pub async fn open_in_memory() -> Result<Self, TelemetryError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(from_tokio_rusqlite)?;

        let store = Self { conn };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<(), TelemetryError> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "
                    PRAGMA journal_mode = WAL;
                    PRAGMA synchronous = NORMAL;
                    PRAGMA busy_timeout = 5000;
                    ",
                )?;
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await
            .map_err(from_tokio_rusqlite)
    }
}

impl ReadingStore for SqliteStore {
    #[instrument(
        name = "store_append",
        skip(self, input),
        fields(device_id = %input.device_id, sensor_type = %input.sensor_type)
    )]
    async fn append(&self, input: &ReadingInput) -> Result<Reading, TelemetryError> {
        // Channel-asserted receipt time wins, else append time. Normalized to
        // millisecond precision so the returned reading equals a later query hit.
        let timestamp = millis_to_datetime(
            input
                .timestamp
                .unwrap_or_else(Utc::now)
                .timestamp_millis(),
        );
        let timestamp_ms = timestamp.timestamp_millis();
        let row = input.clone();

        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO readings (device_id, sensor_type, value, timestamp_ms, unit)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        row.device_id,
                        row.sensor_type,
                        row.value,
                        timestamp_ms,
                        row.unit,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(from_tokio_rusqlite)?;

        debug!(id, "Reading appended");

        Ok(Reading {
            id,
            device_id: input.device_id.clone(),
            sensor_type: input.sensor_type.clone(),
            value: input.value,
            unit: input.unit.clone(),
            timestamp,
        })
    }

    #[instrument(name = "store_query", skip(self, filter))]
    async fn query(
        &self,
        filter: &ReadingFilter,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<Reading>, TelemetryError> {
        let filter = filter.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(
                    "SELECT id, device_id, sensor_type, value, timestamp_ms, unit
                     FROM readings
                     WHERE (?1 IS NULL OR device_id = ?1)
                       AND (?2 IS NULL OR sensor_type = ?2)
                     ORDER BY timestamp_ms DESC, id DESC
                     LIMIT ?3 OFFSET ?4",
                )?;

                let rows = stmt.query_map(
                    rusqlite::params![
                        filter.device_id,
                        filter.sensor_type,
                        limit as i64,
                        skip as i64,
                    ],
                    row_to_reading,
                )?;

                let mut readings = Vec::new();
                for row in rows {
                    readings.push(row?);
                }
                Ok(readings)
            })
            .await
            .map_err(from_tokio_rusqlite)
    }
}

fn row_to_reading(row: &rusqlite::Row<'_>) -> rusqlite::Result<Reading> {
    Ok(Reading {
        id: row.get(0)?,
        device_id: row.get(1)?,
        sensor_type: row.get(2)?,
        value: row.get(3)?,
        timestamp: millis_to_datetime(row.get(4)?),
        unit: row.get(5)?,
    })
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn input(device: &str, sensor: &str, value: f64) -> ReadingInput {
        ReadingInput {
            device_id: device.to_string(),
            sensor_type: sensor.to_string(),
            value,
            unit: None,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let store = SqliteStore::open_in_memory().await.unwrap();

        let first = store.append(&input("dev1", "temp", 21.5)).await.unwrap();
        let second = store.append(&input("dev1", "temp", 22.0)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.unit.is_none());
    }

    #[tokio::test]
    async fn test_append_stamps_timestamp_when_absent() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let before = Utc::now();

        let reading = store.append(&input("dev1", "temp", 21.5)).await.unwrap();

        let after = Utc::now();
        assert!(reading.timestamp >= millis_to_datetime(before.timestamp_millis()));
        assert!(reading.timestamp <= after);
    }

    #[tokio::test]
    async fn test_append_preserves_asserted_timestamp() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let asserted = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let mut raw = input("dev1", "temp", 21.5);
        raw.timestamp = Some(asserted);
        let reading = store.append(&raw).await.unwrap();

        assert_eq!(reading.timestamp, asserted);

        let found = store
            .query(&ReadingFilter::any(), 0, 10)
            .await
            .unwrap()
            .remove(0);
        assert_eq!(found, reading);
    }

    #[tokio::test]
    async fn test_query_filters_and_combine() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.append(&input("dev1", "temp", 1.0)).await.unwrap();
        store.append(&input("dev1", "humidity", 2.0)).await.unwrap();
        store.append(&input("dev2", "temp", 3.0)).await.unwrap();

        let by_device = store
            .query(&ReadingFilter::any().device("dev1"), 0, 100)
            .await
            .unwrap();
        assert_eq!(by_device.len(), 2);

        let both = store
            .query(
                &ReadingFilter::any().device("dev1").sensor("temp"),
                0,
                100,
            )
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].value, 1.0);
    }

    #[tokio::test]
    async fn test_query_orders_by_timestamp_descending() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        for (i, ms) in [3_000_i64, 1_000, 2_000].iter().enumerate() {
            let mut raw = input("dev1", "temp", i as f64);
            raw.timestamp = DateTime::from_timestamp_millis(*ms);
            store.append(&raw).await.unwrap();
        }

        let readings = store.query(&ReadingFilter::any(), 0, 100).await.unwrap();
        let times: Vec<i64> = readings.iter().map(|r| r.timestamp.timestamp_millis()).collect();
        assert_eq!(times, vec![3_000, 2_000, 1_000]);
    }

    #[tokio::test]
    async fn test_query_skip_limit_after_ordering() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        for ms in [1_000_i64, 2_000, 3_000, 4_000] {
            let mut raw = input("dev1", "temp", ms as f64);
            raw.timestamp = DateTime::from_timestamp_millis(ms);
            store.append(&raw).await.unwrap();
        }

        let page = store.query(&ReadingFilter::any(), 1, 2).await.unwrap();
        let times: Vec<i64> = page.iter().map(|r| r.timestamp.timestamp_millis()).collect();
        assert_eq!(times, vec![3_000, 2_000]);
    }

    #[tokio::test]
    async fn test_repeated_query_returns_identical_results() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.append(&input("dev1", "temp", 1.0)).await.unwrap();
        store.append(&input("dev2", "temp", 2.0)).await.unwrap();
        store.append(&input("dev1", "humidity", 3.0)).await.unwrap();

        let filter = ReadingFilter::any().device("dev1");
        let first = store.query(&filter, 0, 100).await.unwrap();
        let second = store.query(&filter, 0, 100).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_query_no_match_is_empty_not_error() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let readings = store
            .query(&ReadingFilter::any().device("ghost"), 0, 100)
            .await
            .unwrap();
        assert!(readings.is_empty());
    }

    #[tokio::test]
    async fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readings.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.append(&input("dev1", "temp", 21.5)).await.unwrap();
        }

        let store = SqliteStore::open(&path).await.unwrap();
        let readings = store.query(&ReadingFilter::any(), 0, 10).await.unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].device_id, "dev1");
    }
}
