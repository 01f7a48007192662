//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    server: ServerInfo,
    database: String,
    mqtt: MqttInfo,
    forwarder: ForwarderInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct ServerInfo {
    host: String,
    port: u16,
}

#[derive(Serialize)]
struct MqttInfo {
    enabled: bool,
    broker: String,
    topic: String,
    reconnect_delay_secs: u64,
}

#[derive(Serialize)]
struct ForwarderInfo {
    queue_capacity: usize,
    sink_timeout_secs: u64,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    kind: String,
    enabled: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::ServiceBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                kind: format!("{:?}", s.kind),
                enabled: s.enabled,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        server: ServerInfo {
            host: blueprint.server.host.clone(),
            port: blueprint.server.port,
        },
        database: blueprint.database.path.clone(),
        mqtt: MqttInfo {
            enabled: blueprint.mqtt.enabled,
            broker: format!(
                "{}:{}",
                blueprint.mqtt.broker_host, blueprint.mqtt.broker_port
            ),
            topic: blueprint.mqtt.topic.clone(),
            reconnect_delay_secs: blueprint.mqtt.reconnect_delay_secs,
        },
        forwarder: ForwarderInfo {
            queue_capacity: blueprint.forwarder.queue_capacity,
            sink_timeout_secs: blueprint.forwarder.sink_timeout_secs,
        },
        sinks,
    }
}

fn print_config_info(blueprint: &contracts::ServiceBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 IoT Data Hub Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("🌐 Server");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!(
        "   ├─ Listen: {}:{}",
        blueprint.server.host, blueprint.server.port
    );
    println!("   └─ Database: {}", blueprint.database.path);

    println!("\n📡 MQTT");
    if blueprint.mqtt.enabled {
        println!(
            "   ├─ Broker: {}:{}",
            blueprint.mqtt.broker_host, blueprint.mqtt.broker_port
        );
        println!("   ├─ Topic: {}", blueprint.mqtt.topic);
        println!(
            "   └─ Reconnect delay: {}s",
            blueprint.mqtt.reconnect_delay_secs
        );
    } else {
        println!("   └─ Disabled");
    }

    println!("\n⚙️  Forwarder");
    println!("   ├─ Queue capacity: {}", blueprint.forwarder.queue_capacity);
    println!(
        "   └─ Sink timeout: {}s",
        blueprint.forwarder.sink_timeout_secs
    );

    if args.sinks || !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            let status = if sink.enabled { "" } else { " [disabled]" };
            println!("   {} {} ({:?}){}", prefix, sink.name, sink.kind, status);
        }
    }

    println!();
}
