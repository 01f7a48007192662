//! # Adapters
//!
//! Inbound channels of the hub: HTTP (`POST /data`, `GET /data`, `GET /`),
//! WebSocket (`/ws`), and the MQTT subscriber.
//!
//! Adapters only decode frames and shape per-channel responses. Field
//! checks all happen in the ingestion pipeline, so a payload that decodes
//! on one channel is accepted or rejected identically on every other.

pub mod http;
pub mod mqtt;
pub mod state;
pub mod ws;

pub use http::router;
pub use mqtt::MqttSubscriber;
pub use state::AppState;
