//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    server: String,
    database: String,
    mqtt_enabled: bool,
    sink_count: usize,
    enabled_sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let enabled_sink_count = blueprint.sinks.iter().filter(|s| s.enabled).count();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    server: format!("{}:{}", blueprint.server.host, blueprint.server.port),
                    database: blueprint.database.path.clone(),
                    mqtt_enabled: blueprint.mqtt.enabled,
                    sink_count: blueprint.sinks.len(),
                    enabled_sink_count,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::ServiceBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - accepted readings will not be forwarded".to_string());
    } else if blueprint.sinks.iter().all(|s| !s.enabled) {
        warnings.push("All sinks are disabled - accepted readings will not be forwarded".to_string());
    } else {
        for sink in blueprint.sinks.iter().filter(|s| !s.enabled) {
            warnings.push(format!("Sink '{}' is disabled", sink.name));
        }
    }

    if !blueprint.mqtt.enabled {
        warnings.push("MQTT subscriber disabled - readings arrive via HTTP/WS only".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Server: {}", summary.server);
            println!("  Database: {}", summary.database);
            println!("  MQTT: {}", if summary.mqtt_enabled { "enabled" } else { "disabled" });
            println!(
                "  Sinks: {} ({} enabled)",
                summary.sink_count, summary.enabled_sink_count
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn validate_file(content: &str) -> ValidationResult {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        };
        validate_config(&args)
    }

    #[test]
    fn test_valid_config() {
        let result = validate_file(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8000

            [[sinks]]
            name = "hook"
            kind = "webhook"
            params = { url = "http://127.0.0.1:9000/hook" }
            "#,
        );
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.server, "127.0.0.1:8000");
        assert_eq!(summary.enabled_sink_count, 1);
    }

    #[test]
    fn test_missing_file() {
        let args = ValidateArgs {
            config: "no-such-config.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_webhook_without_url_is_invalid() {
        let result = validate_file(
            r#"
            [[sinks]]
            name = "hook"
            kind = "webhook"
            "#,
        );
        assert!(!result.valid);
    }

    #[test]
    fn test_no_sinks_warns() {
        let result = validate_file("[server]\nport = 8000\n");
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("No sinks configured")));
    }
}
