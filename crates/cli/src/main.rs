//! `bimdiff` — compare two building-model snapshots and report every
//! semantic difference beyond a numeric tolerance.
//!
//! Snapshots are JSON files of already-extracted entity records; the exit
//! code is the shell contract: scripts rely on it.

mod snapshot;

use std::path::PathBuf;
use std::process::ExitCode;

use bimdiff_recon::CompareConfig;
use clap::Parser;

/// Success - snapshots are tolerance-equal.
const EXIT_CLEAN: u8 = 0;
/// Differences were found and reported.
const EXIT_DIFFERENCES: u8 = 1;
/// Usage error - bad arguments, unreadable input, invalid config.
const EXIT_USAGE: u8 = 2;
/// Runtime error - comparison aborted (malformed entity, nesting blowout).
const EXIT_RUNTIME: u8 = 3;

#[derive(Parser)]
#[command(name = "bimdiff")]
#[command(about = "Tolerant diff over building-model snapshots")]
#[command(version)]
#[command(after_help = "\
Examples:
  bimdiff -b before.json -a after.json
  bimdiff -b before.json -a after.json -c compare.toml -o differences.json
  bimdiff -b before.json -a after.json --tolerance 1e-3 --json")]
struct Cli {
    /// "Before" snapshot (JSON object keyed by identity, or array of records)
    #[arg(long, short = 'b')]
    before: PathBuf,

    /// "After" snapshot
    #[arg(long, short = 'a')]
    after: PathBuf,

    /// Comparison config TOML (tolerance, ignored keys, strategies, exclusions)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Write the JSON report to this file
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Print the JSON report to stdout instead of only the summary
    #[arg(long)]
    json: bool,

    /// Override the configured tolerance
    #[arg(long)]
    tolerance: Option<f64>,
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
}

impl CliError {
    fn usage(message: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: message.into() }
    }

    fn runtime(message: impl Into<String>) -> Self {
        Self { code: EXIT_RUNTIME, message: message.into() }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_compare(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {}", e.message);
            ExitCode::from(e.code)
        }
    }
}

fn run_compare(cli: Cli) -> Result<u8, CliError> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                CliError::usage(format!("cannot read config {}: {e}", path.display()))
            })?;
            CompareConfig::from_toml(&text).map_err(|e| CliError::usage(e.to_string()))?
        }
        None => CompareConfig::default(),
    };

    if let Some(tolerance) = cli.tolerance {
        config.tolerance = tolerance;
        config.validate().map_err(|e| CliError::usage(e.to_string()))?;
    }

    let before = snapshot::load(&cli.before, "before", &config.identity_key)
        .map_err(|e| CliError::usage(e.to_string()))?;
    let after = snapshot::load(&cli.after, "after", &config.identity_key)
        .map_err(|e| CliError::usage(e.to_string()))?;

    let report = bimdiff_recon::run(&config, &before, &after)
        .map_err(|e| CliError::runtime(e.to_string()))?;

    // Human summary to stderr; stdout stays clean for --json
    let s = &report.summary;
    eprintln!(
        "{} vs {} entities — {} unchanged, {} changed, {} added, {} removed, {} excluded; {} difference(s)",
        s.entities_before,
        s.entities_after,
        s.unchanged,
        s.changed,
        s.added,
        s.removed,
        s.excluded,
        s.differences,
    );

    if cli.output.is_some() || cli.json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = cli.output {
            std::fs::write(path, &json_str).map_err(|e| {
                CliError::runtime(format!("cannot write {}: {e}", path.display()))
            })?;
            eprintln!("wrote {}", path.display());
        }

        if cli.json {
            println!("{json_str}");
        }
    }

    Ok(if report.matched { EXIT_CLEAN } else { EXIT_DIFFERENCES })
}
