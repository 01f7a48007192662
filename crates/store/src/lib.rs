//! # Store
//!
//! Durable append-and-query log of readings.
//!
//! Responsibilities:
//! - Own the SQLite schema (append-only `readings` relation)
//! - Assign monotonically increasing ids on append
//! - Stamp ingestion time when the input carries none
//! - Serve filtered, ordered queries

mod sqlite;

pub use contracts::{Reading, ReadingFilter, ReadingInput, ReadingStore};
pub use sqlite::SqliteStore;
