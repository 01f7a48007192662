//! Configuration validation
//!
//! Rules:
//! - derive-level field constraints (lengths, ranges)
//! - sink names unique
//! - webhook sinks require a `url` param
//! - logseq sinks require `api_url` and `token` params
//! - MQTT topic non-empty when the subscriber is enabled

use std::collections::HashSet;

use contracts::{ServiceBlueprint, SinkConfig, SinkKind, TelemetryError};
use validator::Validate;

/// Validate a ServiceBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &ServiceBlueprint) -> Result<(), TelemetryError> {
    validate_fields(blueprint)?;
    validate_mqtt(blueprint)?;
    validate_sink_names(blueprint)?;
    validate_sink_params(blueprint)?;
    Ok(())
}

/// Run derive-level constraints from the blueprint types
fn validate_fields(blueprint: &ServiceBlueprint) -> Result<(), TelemetryError> {
    blueprint.validate().map_err(|e| {
        let field = e
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        TelemetryError::config_validation(field, e.to_string())
    })
}

/// Validate MQTT settings when enabled
fn validate_mqtt(blueprint: &ServiceBlueprint) -> Result<(), TelemetryError> {
    if blueprint.mqtt.enabled && blueprint.mqtt.topic.is_empty() {
        return Err(TelemetryError::config_validation(
            "mqtt.topic",
            "topic cannot be empty when mqtt is enabled",
        ));
    }
    Ok(())
}

/// Validate sink name uniqueness
fn validate_sink_names(blueprint: &ServiceBlueprint) -> Result<(), TelemetryError> {
    let mut seen = HashSet::new();
    for sink in &blueprint.sinks {
        if !seen.insert(&sink.name) {
            return Err(TelemetryError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// Validate kind-specific required params
fn validate_sink_params(blueprint: &ServiceBlueprint) -> Result<(), TelemetryError> {
    for sink in &blueprint.sinks {
        match sink.kind {
            SinkKind::Webhook => require_param(sink, "url")?,
            SinkKind::Logseq => {
                require_param(sink, "api_url")?;
                require_param(sink, "token")?;
            }
            SinkKind::Log => {}
        }
    }
    Ok(())
}

fn require_param(sink: &SinkConfig, key: &str) -> Result<(), TelemetryError> {
    match sink.params.get(key) {
        Some(value) if !value.is_empty() => Ok(()),
        _ => Err(TelemetryError::config_validation(
            format!("sinks[{}].params.{}", sink.name, key),
            format!("{key} is required for {:?} sinks", sink.kind),
        )),
    }
}
