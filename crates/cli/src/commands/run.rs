//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::service::{Service, ServiceConfig};

/// Execute the `run` command
pub async fn run_service(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref host) = args.host {
        info!(host = %host, "Overriding bind host from CLI");
        blueprint.server.host = host.clone();
    }
    if let Some(port) = args.port {
        info!(port = %port, "Overriding bind port from CLI");
        blueprint.server.port = port;
    }
    if let Some(ref database) = args.database {
        info!(database = %database, "Overriding database path from CLI");
        blueprint.database.path = database.clone();
    }

    info!(
        host = %blueprint.server.host,
        port = blueprint.server.port,
        database = %blueprint.database.path,
        mqtt = blueprint.mqtt.enabled,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build service configuration
    let service_config = ServiceConfig {
        blueprint,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let service = Service::new(service_config);

    info!("Starting service...");

    let stats = service
        .run(setup_shutdown_signal())
        .await
        .context("Service execution failed")?;

    info!(
        received = stats.received,
        accepted = stats.accepted,
        duration_secs = stats.duration.as_secs_f64(),
        "Service stopped"
    );

    stats.print_summary();

    info!("IoT Data Hub finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Received shutdown signal, stopping service...");
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::ServiceBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Server:");
    println!("  Listen: {}:{}", blueprint.server.host, blueprint.server.port);
    println!("  Database: {}", blueprint.database.path);

    println!("\nMQTT:");
    if blueprint.mqtt.enabled {
        println!(
            "  Broker: {}:{}",
            blueprint.mqtt.broker_host, blueprint.mqtt.broker_port
        );
        println!("  Topic: {}", blueprint.mqtt.topic);
    } else {
        println!("  Disabled");
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            let status = if sink.enabled { "" } else { " [disabled]" };
            println!("  - {} ({:?}){}", sink.name, sink.kind, status);
        }
    }

    println!();
}
