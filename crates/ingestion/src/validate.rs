//! Field validation shared by all inbound adapters
//!
//! The original system duplicated these checks per adapter with minor
//! divergences; they live here once.

use contracts::{RawReading, ReadingInput, RejectReason};
use serde_json::Value;

/// Validate a raw reading into pipeline input.
///
/// Requires non-empty `device_id`, non-empty `sensor_type`, and a numeric
/// `value`. Numeric strings are coerced (`"21.5"` → 21.5); no range
/// validation is performed.
pub fn validate(raw: RawReading) -> Result<ReadingInput, RejectReason> {
    let device_id = raw
        .device_id
        .filter(|s| !s.is_empty())
        .ok_or(RejectReason::MissingDeviceId)?;

    let sensor_type = raw
        .sensor_type
        .filter(|s| !s.is_empty())
        .ok_or(RejectReason::MissingSensorType)?;

    let value = match raw.value {
        None | Some(Value::Null) => return Err(RejectReason::MissingValue),
        Some(v) => coerce_value(&v).ok_or(RejectReason::InvalidValue)?,
    };

    Ok(ReadingInput {
        device_id,
        sensor_type,
        value,
        unit: raw.unit,
        timestamp: raw.timestamp,
    })
}

fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
