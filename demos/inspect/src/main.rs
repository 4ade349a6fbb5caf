//! Lattice Inspect
//!
//! Decodes every event in a JSON file and prints a report of what was found:
//! counts per layer, type and message subtype, plus any violations.
//!
//! The file may hold a plain array of events, an object with an `"events"`
//! array, or a whole sync response.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package lattice-inspect -- sync.json
//! cargo run --package lattice-inspect -- --layer state --strict state.json
//! LATTICE_LOGGING__LEVEL=debug cargo run --package lattice-inspect -- --json events.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lattice_runtime::config::{ConfigLoader, LayerSelection, validate_config};
use lattice_runtime::{Inspector, logging};
use tracing::{info, warn};

/// Envelope to decode every event as.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayerArg {
    Auto,
    Base,
    Stripped,
    Room,
    State,
}

impl From<LayerArg> for LayerSelection {
    fn from(arg: LayerArg) -> Self {
        match arg {
            LayerArg::Auto => Self::Auto,
            LayerArg::Base => Self::Base,
            LayerArg::Stripped => Self::Stripped,
            LayerArg::Room => Self::Room,
            LayerArg::State => Self::State,
        }
    }
}

/// Decode a file of wire events and report what was found.
#[derive(Parser, Debug)]
#[command(name = "lattice-inspect", version)]
struct Args {
    /// Configuration file (defaults to lattice.toml / config.toml in the usual places)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Envelope to decode every event as
    #[arg(short, long, value_enum)]
    layer: Option<LayerArg>,

    /// Exit with a failure status if any violation is found
    #[arg(long)]
    strict: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Input file
    file: PathBuf,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let mut config = loader.load().context("Failed to load configuration")?;
    if let Some(layer) = args.layer {
        config.inspect.layer = layer.into();
    }
    config.inspect.strict |= args.strict;
    validate_config(&config).context("Invalid configuration")?;

    logging::init_from_config(&config.logging);

    let strict = config.inspect.strict;
    let inspector = Inspector::new(config.inspect);
    let report = inspector
        .inspect_file(&args.file)
        .with_context(|| format!("Failed to inspect {}", args.file.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }

    if strict && report.has_violations() {
        warn!(
            partial = report.partial,
            round_trip_failures = report.round_trip_failures,
            "Violations found in strict mode"
        );
        return Ok(ExitCode::FAILURE);
    }

    info!(file = %args.file.display(), "Done");
    Ok(ExitCode::SUCCESS)
}
