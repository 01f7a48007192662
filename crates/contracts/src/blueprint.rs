//! ServiceBlueprint - Config Loader output
//!
//! Describes the complete service configuration: HTTP/WS server, database,
//! MQTT subscriber, forwarder tuning, and outbound sink routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete service configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// HTTP/WebSocket server settings
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    /// Reading store settings
    #[serde(default)]
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// MQTT subscriber settings
    #[serde(default)]
    #[validate(nested)]
    pub mqtt: MqttConfig,

    /// Forwarder tuning
    #[serde(default)]
    #[validate(nested)]
    pub forwarder: ForwarderConfig,

    /// Outbound sink routing
    #[serde(default)]
    #[validate(nested)]
    pub sinks: Vec<SinkConfig>,
}

/// HTTP/WebSocket server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_server_host")]
    #[validate(length(min = 1))]
    pub host: String,

    /// Bind port
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

/// Reading store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// SQLite database file path
    #[serde(default = "default_database_path")]
    #[validate(length(min = 1))]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "iot_data.db".to_string()
}

/// MQTT subscriber configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MqttConfig {
    /// Whether the subscriber runs at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Broker host
    #[serde(default = "default_mqtt_host")]
    #[validate(length(min = 1))]
    pub broker_host: String,

    /// Broker port
    #[serde(default = "default_mqtt_port")]
    pub broker_port: u16,

    /// Optional credentials; both must be set to take effect
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Topic pattern to subscribe to
    #[serde(default = "default_mqtt_topic")]
    pub topic: String,

    /// Pacing between reconnect attempts after a connection error
    #[serde(default = "default_reconnect_delay")]
    #[validate(range(min = 1))]
    pub reconnect_delay_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            broker_host: default_mqtt_host(),
            broker_port: default_mqtt_port(),
            username: None,
            password: None,
            topic: default_mqtt_topic(),
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_mqtt_host() -> String {
    "localhost".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_mqtt_topic() -> String {
    "iot/sensors/#".to_string()
}

fn default_reconnect_delay() -> u64 {
    5
}

/// Forwarder tuning
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForwarderConfig {
    /// Capacity of the accepted-readings hand-off queue
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1))]
    pub queue_capacity: usize,

    /// Bounded timeout per sink attempt (seconds)
    #[serde(default = "default_sink_timeout")]
    #[validate(range(min = 1))]
    pub sink_timeout_secs: u64,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            sink_timeout_secs: default_sink_timeout(),
        }
    }
}

fn default_queue_capacity() -> usize {
    256
}

fn default_sink_timeout() -> u64 {
    5
}

/// One outbound sink
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Unique sink name
    #[validate(length(min = 1))]
    pub name: String,

    /// Sink kind
    pub kind: SinkKind,

    /// Independently enabled/disabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Kind-specific parameters (webhook: url; logseq: api_url, token, page_name)
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    Webhook,
    Logseq,
    Log,
}
