//! Configuration parsing
//!
//! Supports TOML (primary) and JSON (optional) formats.

use contracts::{ServiceBlueprint, TelemetryError};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<ServiceBlueprint, TelemetryError> {
    toml::from_str(content).map_err(|e| TelemetryError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<ServiceBlueprint, TelemetryError> {
    serde_json::from_str(content).map_err(|e| TelemetryError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration according to format
pub fn parse(content: &str, format: ConfigFormat) -> Result<ServiceBlueprint, TelemetryError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkKind;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[server]
host = "0.0.0.0"
port = 8080

[database]
path = "iot.db"

[mqtt]
enabled = true
broker_host = "broker.local"
topic = "telemetry/#"

[forwarder]
queue_capacity = 64
sink_timeout_secs = 3

[[sinks]]
name = "hook"
kind = "webhook"
[sinks.params]
url = "http://example.com/hook"

[[sinks]]
name = "notes"
kind = "logseq"
enabled = false
[sinks.params]
api_url = "http://127.0.0.1:12315/api"
token = "secret"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.server.port, 8080);
        assert_eq!(bp.mqtt.topic, "telemetry/#");
        assert_eq!(bp.forwarder.queue_capacity, 64);
        assert_eq!(bp.sinks.len(), 2);
        assert_eq!(bp.sinks[0].kind, SinkKind::Webhook);
        assert!(!bp.sinks[1].enabled);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "database": { "path": "iot.db" },
            "mqtt": { "enabled": false },
            "sinks": [{
                "name": "hook",
                "kind": "webhook",
                "params": { "url": "http://example.com/hook" }
            }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, TelemetryError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
