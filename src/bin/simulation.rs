//! Synthetic Sensor Signal Generator
//!
//! Writes `timestamp,value` CSV for one of the built-in signal profiles to
//! stdout, ready to feed into `sensor-identifier identify --csv`.
//!
//! # Usage
//! ```bash
//! ./signal-simulation --profile current-loop-ramp --seed 42 > loop.csv
//! ./sensor-identifier identify --csv loop.csv --name "Loop AI-04" --location "Panel A"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufWriter, Write};

use sensor_identifier::simulation::{generate, Profile};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "signal-simulation")]
#[command(about = "Synthetic sensor signals for sensor-identifier testing")]
#[command(version)]
struct Args {
    /// Signal profile to generate
    #[arg(short, long, default_value = "temperature-sine")]
    profile: Profile,

    /// Number of samples (profile default if omitted)
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Sample interval in seconds (profile default if omitted)
    #[arg(long)]
    interval: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Omit the CSV header line
    #[arg(long)]
    no_header: bool,

    /// List the available profiles and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list {
        for p in Profile::ALL {
            println!(
                "{:<20} {} samples @ {} s",
                p.name(),
                p.default_samples(),
                p.default_interval()
            );
        }
        return Ok(());
    }

    let samples = args.samples.unwrap_or_else(|| args.profile.default_samples());
    let interval = args.interval.unwrap_or_else(|| args.profile.default_interval());
    let series = generate(args.profile, samples, interval, args.seed)
        .with_context(|| format!("Failed to generate '{}' profile", args.profile))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if !args.no_header {
        writeln!(out, "timestamp,value")?;
    }
    for p in series.points() {
        writeln!(out, "{:.6},{:.6}", p.timestamp, p.value)?;
    }
    out.flush()?;

    eprintln!(
        "Generated {} samples of '{}' ({:.1} s)",
        series.len(),
        args.profile,
        series.duration()
    );
    Ok(())
}
