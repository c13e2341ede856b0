//! Sensor Identifier - command-line front end
//!
//! ```bash
//! sensor-identifier identify --csv tt101.csv --name "Fermentation Tank 1" --location "Cellar"
//! sensor-identifier batch --manifest plant.toml
//! sensor-identifier rules
//! ```
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use sensor_identifier::sensors::read_series_csv;
use sensor_identifier::{DeviceContext, Explanation, IdentificationRequest, IdentifiedSensor, IdentifierConfig, SensorIdentifier};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "sensor-identifier")]
#[command(about = "Identify industrial sensors from their signal behaviour")]
#[command(version)]
struct CliArgs {
    /// Configuration file (overrides $SENSOR_IDENTIFIER_CONFIG and ./sensor_identifier.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Identify a single sensor from a timestamp,value CSV file
    Identify {
        /// Path to the CSV file
        #[arg(long)]
        csv: PathBuf,
        /// Device name used for keyword matching
        #[arg(long, default_value = "")]
        name: String,
        /// Device location used for keyword matching
        #[arg(long, default_value = "")]
        location: String,
        /// Sensor identifier (defaults to the CSV file stem)
        #[arg(long)]
        id: Option<String>,
        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
        /// Include the per-rule score breakdown
        #[arg(long)]
        explain: bool,
    },

    /// Identify every sensor listed in a TOML manifest, in parallel
    Batch {
        /// Manifest with one [[sensor]] table per CSV file
        #[arg(long)]
        manifest: PathBuf,
        /// Pretty-print the JSON result
        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective configuration, including rule tables, as TOML
    Rules,
}

// ============================================================================
// Batch Manifest
// ============================================================================

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(rename = "sensor", default)]
    sensors: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: String,
    /// Relative paths resolve against the manifest directory
    csv: PathBuf,
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: String,
}

#[derive(Serialize)]
struct ExplainedResult<'a> {
    result: &'a IdentifiedSensor,
    explanation: Explanation,
}

// ============================================================================
// Commands
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<IdentifierConfig> {
    match path {
        Some(p) => {
            let config = IdentifierConfig::load_from_file(p)
                .with_context(|| format!("Failed to load config {}", p.display()))?;
            info!(path = %p.display(), "Loaded identifier config");
            Ok(config)
        }
        None => Ok(IdentifierConfig::load()),
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.context("Failed to serialize result")
}

fn run_identify(
    identifier: &SensorIdentifier,
    csv: &Path,
    context: &DeviceContext,
    id: Option<String>,
    pretty: bool,
    explain: bool,
) -> Result<()> {
    let series = read_series_csv(csv).with_context(|| format!("Failed to read {}", csv.display()))?;
    let sensor_id = id.unwrap_or_else(|| {
        csv.file_stem()
            .map_or_else(|| "sensor".to_string(), |s| s.to_string_lossy().into_owned())
    });

    let result = identifier.identify(&sensor_id, &series, context);
    let output = if explain {
        to_json(
            &ExplainedResult {
                explanation: identifier.explain(&result, context),
                result: &result,
            },
            pretty,
        )?
    } else {
        result.to_json(pretty).context("Failed to serialize result")?
    };
    println!("{output}");
    Ok(())
}

fn run_batch(identifier: &SensorIdentifier, manifest_path: &Path, pretty: bool) -> Result<()> {
    let text = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("Failed to read manifest {}", manifest_path.display()))?;
    let manifest: Manifest =
        toml::from_str(&text).with_context(|| format!("Invalid manifest {}", manifest_path.display()))?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let requests = manifest
        .sensors
        .into_iter()
        .map(|entry| {
            let path = base.join(&entry.csv);
            let series =
                read_series_csv(&path).with_context(|| format!("Failed to read {} for {}", path.display(), entry.id))?;
            Ok(IdentificationRequest {
                sensor_id: entry.id,
                series,
                context: DeviceContext::new(entry.name, entry.location),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let results = identifier.identify_batch(&requests);
    println!("{}", to_json(&results, pretty)?);
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let config = load_config(args.config.as_deref())?;

    match args.command {
        SubCommand::Identify {
            csv,
            name,
            location,
            id,
            pretty,
            explain,
        } => {
            let identifier = SensorIdentifier::new(config);
            run_identify(&identifier, &csv, &DeviceContext::new(name, location), id, pretty, explain)
        }
        SubCommand::Batch { manifest, pretty } => {
            let identifier = SensorIdentifier::new(config);
            run_batch(&identifier, &manifest, pretty)
        }
        SubCommand::Rules => {
            let text = config
                .with_effective_rules()
                .to_toml()
                .context("Failed to render configuration")?;
            print!("{text}");
            Ok(())
        }
    }
}
